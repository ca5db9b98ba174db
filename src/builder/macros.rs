//! Macros for ergonomic state machine construction.

/// Declare a fieldless enum usable as a state or event tag.
///
/// Derives everything [`Tag`](crate::core::Tag) requires and implements
/// `name` from the variant identifiers.
///
/// # Example
///
/// ```
/// use tickstate::core::Tag;
/// use tickstate::tag_enum;
///
/// tag_enum! {
///     /// Movement states of a character.
///     pub enum Movement {
///         Normal,
///         Dodging,
///         Disabled,
///     }
/// }
///
/// assert_eq!(Movement::Dodging.name(), "Dodging");
/// ```
#[macro_export]
macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            Debug,
            serde::Serialize,
            serde::Deserialize,
        )]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::Tag for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
