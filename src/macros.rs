// SPDX-License-Identifier: MIT

/// Generates a CoSWID map entity: the struct itself plus `Serialize` and
/// `Deserialize` implementations honoring both wire conventions from one
/// declaration.
///
/// Each field is declared with its integer CBOR key, its JSON member name
/// and whether the schema requires it:
///
/// ```ignore
/// coswid_map! {
///     #[derive(Debug, Clone, PartialEq, Eq)]
///     pub struct Process {
///         [15, "lang", optional] pub lang: Option<Text>,
///         [27, "process-name", required] pub process_name: Text,
///         [28, "pid", optional] pub pid: Option<i64>,
///     }
/// }
/// ```
///
/// Serialization branches on `is_human_readable`: integer keys for CBOR,
/// member names for JSON. Optional fields are omitted when `None`; required
/// fields are always emitted, including schema defaults such as a zero
/// `tag-version`. Deserialization accepts either key convention in any
/// order, rejects duplicate keys, errors on an absent required field and
/// silently drops members the schema does not model.
#[macro_export]
macro_rules! coswid_map {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                [$ck:literal, $jk:literal, $kind:ident] $fvis:vis $field:ident : $ty:ty,
            )*
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                use ::serde::ser::SerializeMap;

                let human = serializer.is_human_readable();
                let len = 0usize $( + $crate::coswid_map!(@count $kind, &self.$field) )*;
                let mut map = serializer.serialize_map(Some(len))?;
                $(
                    $crate::coswid_map!(@emit $kind, map, human, $ck, $jk, &self.$field);
                )*
                map.end()
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                struct MapVisitor;

                impl<'de> ::serde::de::Visitor<'de> for MapVisitor {
                    type Value = $name;

                    fn expecting(
                        &self,
                        formatter: &mut ::std::fmt::Formatter,
                    ) -> ::std::fmt::Result {
                        formatter.write_str(concat!("a ", stringify!($name), " map"))
                    }

                    fn visit_map<A>(
                        self,
                        mut map: A,
                    ) -> ::std::result::Result<Self::Value, A::Error>
                    where
                        A: ::serde::de::MapAccess<'de>,
                    {
                        $( let mut $field: ::std::option::Option<$ty> = None; )*

                        while let Some(key) = map.next_key::<$crate::core::MapKey>()? {
                            $(
                                if key.is($ck, $jk) {
                                    if $field.is_some() {
                                        return Err(::serde::de::Error::duplicate_field($jk));
                                    }
                                    $field = Some(map.next_value()?);
                                } else
                            )*
                            {
                                let _ = map.next_value::<::serde::de::IgnoredAny>()?;
                            }
                        }

                        Ok($name {
                            $( $field: $crate::coswid_map!(@finish $kind, $field, $jk), )*
                        })
                    }
                }

                deserializer.deserialize_map(MapVisitor)
            }
        }
    };

    (@count required, $v:expr) => { 1usize };
    (@count optional, $v:expr) => {
        if ($v).is_some() { 1usize } else { 0usize }
    };

    (@emit required, $map:ident, $human:ident, $ck:literal, $jk:literal, $v:expr) => {
        if $human {
            $map.serialize_entry($jk, $v)?;
        } else {
            $map.serialize_entry(&($ck as u64), $v)?;
        }
    };
    (@emit optional, $map:ident, $human:ident, $ck:literal, $jk:literal, $v:expr) => {
        if let Some(inner) = $v {
            if $human {
                $map.serialize_entry($jk, inner)?;
            } else {
                $map.serialize_entry(&($ck as u64), inner)?;
            }
        }
    };

    (@finish required, $field:ident, $jk:literal) => {
        match $field {
            Some(v) => v,
            None => return Err(::serde::de::Error::missing_field($jk)),
        }
    };
    (@finish optional, $field:ident, $jk:literal) => {
        $field.unwrap_or_default()
    };
}
