//! Scoped flush-to-zero / denormals-are-zero control for the current thread.
//!
//! Distance fields evaluated far from the surface or deep inside thin
//! features can drive intermediates into the subnormal range, where x86 SSE
//! arithmetic is dramatically slower. The MXCSR register is per thread, so
//! every worker activates its own guard.
#![allow(unsafe_code)]

use std::marker::PhantomData;

#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse"))]
mod mxcsr {
    #[cfg(target_arch = "x86")]
    use std::arch::x86 as arch;
    #[cfg(target_arch = "x86_64")]
    use std::arch::x86_64 as arch;

    pub const FLUSH_TO_ZERO: u32 = 0x8000;
    pub const DENORMALS_ARE_ZERO: u32 = 0x0040;

    #[inline]
    #[allow(deprecated)]
    pub fn read() -> u32 {
        // SAFETY: SSE is enabled for this target and reading MXCSR has no side effects.
        unsafe { arch::_mm_getcsr() }
    }

    #[inline]
    #[allow(deprecated)]
    pub fn write(value: u32) {
        // SAFETY: callers only toggle the FTZ and DAZ bits of a value read from
        // this thread's MXCSR; that changes rounding of subnormals, nothing else.
        unsafe { arch::_mm_setcsr(value) }
    }
}

/// Keeps FTZ and DAZ enabled on this thread until dropped, then restores the
/// previous floating-point control state.
///
/// A no-op on targets without SSE. Not `Send`: the state it restores belongs to
/// the thread that created it.
#[must_use = "denormal flushing ends when the guard is dropped"]
pub struct DenormalGuard {
    #[cfg_attr(
        not(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse")),
        allow(dead_code)
    )]
    previous: u32,
    _thread_bound: PhantomData<*const ()>,
}

impl DenormalGuard {
    #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse"))]
    pub fn activate() -> DenormalGuard {
        let previous = mxcsr::read();
        mxcsr::write(previous | mxcsr::FLUSH_TO_ZERO | mxcsr::DENORMALS_ARE_ZERO);
        DenormalGuard {
            previous,
            _thread_bound: PhantomData,
        }
    }

    #[cfg(not(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse")))]
    pub const fn activate() -> DenormalGuard {
        DenormalGuard {
            previous: 0,
            _thread_bound: PhantomData,
        }
    }
}

impl Drop for DenormalGuard {
    fn drop(&mut self) {
        #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse"))]
        mxcsr::write(self.previous);
    }
}

/// Whether subnormal results are currently flushed to zero on this thread.
pub fn flush_to_zero_active() -> bool {
    #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse"))]
    {
        mxcsr::read() & mxcsr::FLUSH_TO_ZERO != 0
    }
    #[cfg(not(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse")))]
    {
        false
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse"))]
    fn guard_flushes_and_restores() {
        use crate::float_types::Real;
        use std::hint::black_box;

        assert!(!flush_to_zero_active());
        {
            let _guard = DenormalGuard::activate();
            assert!(flush_to_zero_active());
            let halved = black_box(Real::MIN_POSITIVE) / black_box(2.0);
            assert_eq!(halved, 0.0);
        }
        assert!(!flush_to_zero_active());
        let halved = black_box(Real::MIN_POSITIVE) / black_box(2.0);
        assert!(halved > 0.0);
    }

    #[test]
    fn nested_guards_restore_in_order() {
        let before = flush_to_zero_active();
        {
            let _outer = DenormalGuard::activate();
            {
                let _inner = DenormalGuard::activate();
            }
            assert_eq!(
                flush_to_zero_active(),
                cfg!(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse"))
            );
        }
        assert_eq!(flush_to_zero_active(), before);
    }
}
