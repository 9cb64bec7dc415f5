//! Newtype IDs for type-safe entity references.
//!
//! Shopify identifies everything with opaque global IDs
//! (`gid://shopify/ProductVariant/123`). Use the `define_gid!` macro to wrap
//! them so a product ID can never be passed where a variant ID is expected.
//! Locally generated identifiers (cart lines, chat messages) are UUIDs and
//! use `define_uuid_id!`.

/// Macro to define a type-safe wrapper around a Shopify global ID.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `numeric_id()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use shine_core::define_gid;
/// define_gid!(WidgetId);
///
/// let id = WidgetId::new("gid://shopify/Widget/42");
/// assert_eq!(id.numeric_id(), "42");
/// ```
#[macro_export]
macro_rules! define_gid {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a Shopify global ID string.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying global ID string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The trailing segment of the global ID.
            ///
            /// `gid://shopify/ProductVariant/123?key=v` yields `"123"`. IDs that
            /// are not in GID form are returned unchanged.
            #[must_use]
            pub fn numeric_id(&self) -> &str {
                let tail = self.0.rsplit('/').next().unwrap_or(&self.0);
                tail.split('?').next().unwrap_or(tail)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Macro to define a locally generated UUID identifier.
#[macro_export]
macro_rules! define_uuid_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Generate a fresh random ID.
            #[must_use]
            pub fn generate() -> Self {
                Self(::uuid::Uuid::new_v4())
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                ::uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

// Shopify entities
define_gid!(ProductId);
define_gid!(VariantId);
define_gid!(ImageId);
define_gid!(CustomerId);
define_gid!(AddressId);
define_gid!(OrderId);

// Local entities
define_uuid_id!(LineItemId);
define_uuid_id!(ChatMessageId);
