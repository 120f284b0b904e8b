//! Helper macro for declaring repository error enums.
//!
//! Every variant either carries a single `message: String` or nothing. The
//! macro derives `thiserror::Error` and emits a snake_case constructor per
//! variant, so adapters write `SnippetRepositoryError::query("...")`.

macro_rules! define_port_error {
    (@ctor $variant:ident { message }) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>](message: impl Into<String>) -> Self {
                Self::$variant { message: message.into() }
            }
        }
    };
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $({ $field:ident })? => $display:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($display)]
                $variant $({ $field: String })?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $({ $field })?);
            )*
        }
    };
}

pub(crate) use define_port_error;
