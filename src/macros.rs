#[cfg(feature = "tracing")]
macro_rules! ltrace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "scrollkit", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! ltrace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! ldebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "scrollkit", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! ldebug {
    ($($tt:tt)*) => {};
}
