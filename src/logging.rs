//! Console logging for code that runs in the browser.
//!
//! In the `hydrate` build these write straight to the devtools console; every
//! other build (SSR, native tests) routes them through the `log` facade.

#[cfg(feature = "hydrate")]
macro_rules! console_log {
    ($($t:tt)*) => {
        web_sys::console::log_1(&format!($($t)*).into())
    };
}

#[cfg(not(feature = "hydrate"))]
macro_rules! console_log {
    ($($t:tt)*) => {
        log::info!($($t)*)
    };
}

#[cfg(feature = "hydrate")]
macro_rules! console_warn {
    ($($t:tt)*) => {
        web_sys::console::warn_1(&format!($($t)*).into())
    };
}

#[cfg(not(feature = "hydrate"))]
macro_rules! console_warn {
    ($($t:tt)*) => {
        log::warn!($($t)*)
    };
}

#[cfg(feature = "hydrate")]
macro_rules! console_error {
    ($($t:tt)*) => {
        web_sys::console::error_1(&format!($($t)*).into())
    };
}

#[cfg(not(feature = "hydrate"))]
macro_rules! console_error {
    ($($t:tt)*) => {
        log::error!($($t)*)
    };
}
