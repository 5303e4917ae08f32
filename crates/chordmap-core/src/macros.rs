//! Internal macros.
//!
//! - `choice_enum!` - Declare a choice parameter with a stable integer index

/// Declare a fieldless enum whose variants carry a stable integer index.
///
/// The index is what hosts see for choice parameters and what the persisted
/// state stores, so it must never be renumbered.
///
/// # Example
/// ```ignore
/// choice_enum! {
///     #[derive(Default)]
///     pub enum Mode {
///         #[default]
///         Off = 0,
///         On = 1,
///     }
/// }
/// assert_eq!(Mode::from_index(1), Some(Mode::On));
/// ```
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $index:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[inline]
            pub const fn index(self) -> i32 {
                match self {
                    $($name::$variant => $index),+
                }
            }

            pub fn from_index(index: i32) -> Option<Self> {
                match index {
                    $($index => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}
