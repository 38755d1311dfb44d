
mod borrow;
mod combine;
mod emplace;
mod invoke;
mod lifetime;
mod reflect;
mod storage;

#[cfg(feature = "tracing")]
mod traced;
