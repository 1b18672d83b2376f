//! Closed sets of engine keywords
//!
//! The engine stores most enumerations as plain strings (`"ScreenAll"`,
//! `"ByPasting"`, ...). [`engine_keyword!`] declares a Rust enum together
//! with its exact on-disk spelling so every serializer renders the same text.

/// Declare an enum whose variants map one-to-one onto engine keywords
///
/// Generates `as_str`, `from_engine`, an `ALL` table and a `Display` impl.
/// The enum derives `serde` traits using the variant names, so callers
/// must depend on `serde` with the `derive` feature.
///
/// ```
/// km_core::engine_keyword! {
///     /// Which way to scroll
///     pub enum Direction {
///         Up => "Up",
///         Down => "Down",
///     }
/// }
///
/// assert_eq!(Direction::Up.as_str(), "Up");
/// assert_eq!(Direction::from_engine("Down"), Some(Direction::Down));
/// ```
#[macro_export]
macro_rules! engine_keyword {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $text:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant
            ),+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The exact spelling the engine uses for this value
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Parse the engine spelling back into a variant
            pub fn from_engine(text: &str) -> Option<Self> {
                match text {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    engine_keyword! {
        #[derive(Default)]
        enum Sample {
            #[default]
            First => "FirstValue",
            Second => "SecondValue",
        }
    }

    #[test]
    fn test_keyword_round_trip() {
        for value in Sample::ALL {
            assert_eq!(Sample::from_engine(value.as_str()), Some(*value));
        }
        assert_eq!(Sample::from_engine("Unknown"), None);
    }

    #[test]
    fn test_keyword_default_and_display() {
        assert_eq!(Sample::default(), Sample::First);
        assert_eq!(Sample::Second.to_string(), "SecondValue");
    }

    #[test]
    fn test_keyword_serde_uses_variant_names() {
        let json = serde_json::to_string(&Sample::Second).unwrap();
        assert_eq!(json, "\"Second\"");
    }
}
