//! List/non-null wrapper algebra
//!
//! `layers` flattens a `TypeRef` into its modifier chain, outer to inner,
//! with the named base type always last. Both the type resolver and the
//! coercion synthesizer walk this list instead of recursing on `TypeRef`.

use crate::ir::TypeRef;

/// One element of a flattened type reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer<'a> {
    /// List modifier
    List,
    /// Non-null modifier
    NonNull,
    /// The base type name; always the final layer
    Named(&'a str),
}

impl Layer<'_> {
    pub fn is_modifier(&self) -> bool {
        !matches!(self, Layer::Named(_))
    }
}

/// Strip exactly one modifier. A named type is returned unchanged.
pub fn unwrap_one(ty: &TypeRef) -> &TypeRef {
    match ty {
        TypeRef::List(inner) | TypeRef::NonNull(inner) => inner,
        TypeRef::Named(_) => ty,
    }
}

/// Strip every modifier down to the named base type
pub fn unwrap_full(ty: &TypeRef) -> &TypeRef {
    let mut current = ty;
    while !matches!(current, TypeRef::Named(_)) {
        current = unwrap_one(current);
    }
    current
}

/// Name of the base type under all modifiers
pub fn base_name(ty: &TypeRef) -> &str {
    match unwrap_full(ty) {
        TypeRef::Named(name) => name,
        // unwrap_full only stops on a named type
        TypeRef::List(_) | TypeRef::NonNull(_) => "",
    }
}

/// Flatten a type into its layers, outer to inner, base type last.
///
/// Consecutive non-null markers collapse into one.
pub fn layers(ty: &TypeRef) -> Vec<Layer<'_>> {
    let mut out = Vec::new();
    let mut current = ty;
    loop {
        match current {
            TypeRef::Named(name) => {
                out.push(Layer::Named(name));
                return out;
            }
            TypeRef::List(inner) => {
                out.push(Layer::List);
                current = inner;
            }
            TypeRef::NonNull(inner) => {
                if out.last() != Some(&Layer::NonNull) {
                    out.push(Layer::NonNull);
                }
                current = inner;
            }
        }
    }
}

/// Rebuild a type reference from layers produced by [`layers`].
///
/// Returns `None` unless the last layer, and only the last, is a base type.
pub fn rewrap(layers: &[Layer<'_>]) -> Option<TypeRef> {
    let (base, modifiers) = layers.split_last()?;
    let Layer::Named(name) = base else {
        return None;
    };
    modifiers.iter().rev().try_fold(TypeRef::named(*name), |inner, layer| match layer {
        Layer::List => Some(inner.list()),
        Layer::NonNull => Some(inner.non_null()),
        Layer::Named(_) => None,
    })
}

/// Whether the type is non-null at its outermost position
pub fn is_non_null(ty: &TypeRef) -> bool {
    matches!(ty, TypeRef::NonNull(_))
}

/// Whether the type is a list once any outer non-null marker is stripped
pub fn is_list(ty: &TypeRef) -> bool {
    let mut current = ty;
    while let TypeRef::NonNull(inner) = current {
        current = inner;
    }
    matches!(current, TypeRef::List(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_one_strips_single_layer() {
        let ty = TypeRef::named("Int").list().non_null();
        assert_eq!(unwrap_one(&ty), &TypeRef::named("Int").list());
        assert_eq!(unwrap_one(unwrap_one(&ty)), &TypeRef::named("Int"));

        let base = TypeRef::named("Int");
        assert_eq!(unwrap_one(&base), &base);
    }

    #[test]
    fn test_unwrap_full_reaches_base() {
        let ty = TypeRef::named("Color").non_null().list().list().non_null();
        assert_eq!(unwrap_full(&ty), &TypeRef::named("Color"));
        assert_eq!(base_name(&ty), "Color");
    }

    #[test]
    fn test_layers_bare_type_is_single_element() {
        let ty = TypeRef::named("String");
        assert_eq!(layers(&ty), vec![Layer::Named("String")]);
    }

    #[test]
    fn test_layers_outer_to_inner() {
        let ty = TypeRef::named("Color").list().non_null();
        assert_eq!(
            layers(&ty),
            vec![Layer::NonNull, Layer::List, Layer::Named("Color")]
        );
    }

    #[test]
    fn test_layers_collapse_double_non_null() {
        let ty = TypeRef::named("ID").non_null().non_null();
        assert_eq!(layers(&ty), vec![Layer::NonNull, Layer::Named("ID")]);
        assert_eq!(rewrap(&layers(&ty)), Some(TypeRef::named("ID").non_null()));
    }

    #[test]
    fn test_rewrap_rejects_malformed_layers() {
        assert_eq!(rewrap(&[]), None);
        assert_eq!(rewrap(&[Layer::List]), None);
        assert_eq!(rewrap(&[Layer::Named("A"), Layer::Named("B")]), None);
    }

    #[test]
    fn test_is_list_looks_through_non_null() {
        assert!(is_list(&TypeRef::named("User").list().non_null()));
        assert!(is_list(&TypeRef::named("User").list()));
        assert!(!is_list(&TypeRef::named("User").non_null()));
        assert!(is_non_null(&TypeRef::named("User").non_null()));
    }
}
