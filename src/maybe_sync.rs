//! Feature-gated Send/Sync marker traits for broadcast closures and operands.
//!
//! With the `parallel` feature, [`MaybeSend`] ≡ [`Send`], [`MaybeSync`] ≡
//! [`Sync`] and [`MaybeSendSync`] ≡ [`Send`] + [`Sync`], since evaluation may
//! run on rayon workers. Without it they hold for every type, so broadcasting
//! over `Rc`-holding containers or non-`Sync` closures still compiles.

// ---- parallel enabled: alias to real Send/Sync ----

#[cfg(feature = "parallel")]
pub trait MaybeSend: Send {}
#[cfg(feature = "parallel")]
impl<T: Send> MaybeSend for T {}

#[cfg(feature = "parallel")]
pub trait MaybeSync: Sync {}
#[cfg(feature = "parallel")]
impl<T: Sync + ?Sized> MaybeSync for T {}

#[cfg(feature = "parallel")]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(feature = "parallel")]
impl<T: Send + Sync> MaybeSendSync for T {}

// ---- parallel disabled: blanket impl for all types ----

#[cfg(not(feature = "parallel"))]
pub trait MaybeSend {}
#[cfg(not(feature = "parallel"))]
impl<T> MaybeSend for T {}

#[cfg(not(feature = "parallel"))]
pub trait MaybeSync {}
#[cfg(not(feature = "parallel"))]
impl<T: ?Sized> MaybeSync for T {}

#[cfg(not(feature = "parallel"))]
pub trait MaybeSendSync {}
#[cfg(not(feature = "parallel"))]
impl<T> MaybeSendSync for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use dense_array::DenseArray;

    #[test]
    fn test_dense_operands_satisfy_maybe_traits() {
        fn _check_sync<T: MaybeSync + ?Sized>() {}
        fn _check_send<T: MaybeSend>() {}
        fn _check_send_sync<T: MaybeSendSync>() {}
        _check_sync::<DenseArray<f64>>();
        _check_sync::<[f64]>();
        _check_send::<f64>();
        _check_send_sync::<fn(&f64) -> f64>();
    }

    #[cfg(not(feature = "parallel"))]
    #[test]
    fn test_rc_satisfies_maybe_traits_without_parallel() {
        use std::rc::Rc;
        fn _check_sync<T: MaybeSync>() {}
        fn _check_send_sync<T: MaybeSendSync>() {}
        _check_sync::<Vec<Rc<f64>>>();
        _check_send_sync::<Rc<f64>>();
    }
}
