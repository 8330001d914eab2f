//! Leveled assertions.
//!
//! Cheap invariants are checked with [`arbor_assert_simple!`] in every build. The more
//! expensive levels only run when [`ARBOR_ASSERT_LEVEL_DEFINITION`] is raised, which happens in
//! tests and with the `debug-checks` feature.

#[cfg(all(not(test), not(feature = "debug-checks")))]
pub const ARBOR_ASSERT_LEVEL_DEFINITION: u8 = ARBOR_ASSERT_SIMPLE;

#[cfg(any(test, feature = "debug-checks"))]
pub const ARBOR_ASSERT_LEVEL_DEFINITION: u8 = ARBOR_ASSERT_ADVANCED;

pub const ARBOR_ASSERT_SIMPLE: u8 = 1;
pub const ARBOR_ASSERT_MODERATE: u8 = 2;
pub const ARBOR_ASSERT_ADVANCED: u8 = 3;
pub const ARBOR_ASSERT_EXTREME: u8 = 4;

#[macro_export]
#[doc(hidden)]
macro_rules! arbor_assert_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::ARBOR_ASSERT_LEVEL_DEFINITION >= $crate::asserts::ARBOR_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! arbor_assert_eq_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::ARBOR_ASSERT_LEVEL_DEFINITION >= $crate::asserts::ARBOR_ASSERT_SIMPLE {
            assert_eq!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! arbor_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::asserts::ARBOR_ASSERT_LEVEL_DEFINITION >= $crate::asserts::ARBOR_ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! arbor_assert_advanced {
    ($($arg:tt)*) => {
        if $crate::asserts::ARBOR_ASSERT_LEVEL_DEFINITION >= $crate::asserts::ARBOR_ASSERT_ADVANCED {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! arbor_assert_extreme {
    ($($arg:tt)*) => {
        if $crate::asserts::ARBOR_ASSERT_LEVEL_DEFINITION >= $crate::asserts::ARBOR_ASSERT_EXTREME {
            assert!($($arg)*);
        }
    };
}
