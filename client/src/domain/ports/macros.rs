//! Helper macro for declaring port error enums with ergonomic constructors.

/// Declare a `thiserror` enum and one snake-case constructor per variant.
///
/// Struct-like variants get a constructor taking each field as
/// `impl Into<FieldType>`, so call sites can pass `&str` for `String` fields.
macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build the `", stringify!($variant), "` variant.")]
            #[must_use]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),+ $(,)? }) => {
        ::paste::paste! {
            #[doc = concat!("Build the `", stringify!($variant), "` variant.")]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                Self::$variant { $($field: $field.into()),+ }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),+ $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),+ } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),+ } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for generated constructors.
    define_port_error! {
        pub enum SamplePortError {
            Read { message: String } => "read failed: {message}",
            Status { status: u16, message: String } => "status {status}: {message}",
            Gone => "gone",
        }
    }

    #[test]
    fn string_fields_accept_str() {
        assert_eq!(SamplePortError::read("disk").to_string(), "read failed: disk");
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let err = SamplePortError::status(503_u16, "busy");
        assert_eq!(err.to_string(), "status 503: busy");
        assert!(matches!(err, SamplePortError::Status { status: 503, .. }));
    }

    #[test]
    fn unit_variants_get_constructors() {
        assert_eq!(SamplePortError::gone(), SamplePortError::Gone);
    }
}
