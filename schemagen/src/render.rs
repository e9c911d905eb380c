//! Rust source emission
//!
//! Renders artifact descriptors into formatted Rust files. Every decision is
//! already in the descriptor; this module only maps it onto syntax:
//! - enums get `FromStr` for parse-by-name
//! - records become structs, interfaces become traits
//! - coercion chains become one closure per layer, innermost first
//!
//! Generated code takes `serde_json::Value` as its untyped input and reports
//! failures through a `CoercionError` emitted alongside the runtime types.

use crate::artifact::{ArtifactDescriptor, ArtifactKind, FieldCoercion, FunctionBody, Member, Param};
use crate::coercion::{CoercionChain, CoercionStep, Presence, ScalarShape};
use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::naming::{NameRole, Namer, NamingKey, QualifiedName};
use crate::types::{BaseType, TargetType, WrapperKind};
use heck::{ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use std::collections::{BTreeMap, BTreeSet, HashSet};

type RenderResult<T> = Result<T, String>;

/// A rendered source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Path relative to the output root
    pub name: String,
    /// Formatted source
    pub content: String,
}

/// Renders artifacts of one configuration
#[derive(Debug, Clone)]
pub struct Renderer {
    value_box: QualifiedName,
    error: QualifiedName,
    malformed: QualifiedName,
}

impl Renderer {
    pub fn new(config: &GeneratorConfig) -> Self {
        let namer = Namer::new(config);
        let value_box = namer.compose(&NamingKey::fixed(NameRole::ValueBox));
        let runtime = value_box.namespace.clone();
        Self {
            value_box,
            error: QualifiedName::new(runtime.clone(), "CoercionError"),
            malformed: QualifiedName::new(runtime, "malformed"),
        }
    }

    /// Render every artifact plus the runtime support file and `mod.rs` files
    pub fn render_artifacts(
        &self,
        artifacts: &[ArtifactDescriptor],
    ) -> Result<Vec<RenderedFile>, GenerationError> {
        let mut files = Vec::with_capacity(artifacts.len() + 1);
        files.push(self.render_runtime_support()?);
        for artifact in artifacts {
            files.push(self.render(artifact)?);
        }
        let modules = module_files(&files).map_err(|message| GenerationError::Render {
            artifact: QualifiedName::new("", "mod"),
            message,
        })?;
        files.extend(modules);
        Ok(files)
    }

    /// Render one artifact into its own file
    pub fn render(&self, artifact: &ArtifactDescriptor) -> Result<RenderedFile, GenerationError> {
        let to_error = |message| GenerationError::Render {
            artifact: artifact.name.clone(),
            message,
        };
        let tokens = match artifact.kind {
            ArtifactKind::Enum => self.render_enum(artifact),
            ArtifactKind::Record => self.render_record(artifact),
            ArtifactKind::Interface => self.render_interface(artifact),
            ArtifactKind::Function => self.render_function(artifact),
        }
        .map_err(to_error)?;

        Ok(RenderedFile {
            name: file_path(&artifact.name),
            content: format_code(tokens).map_err(to_error)?,
        })
    }

    /// The `CoercionError` type and helpers used by generated parse functions
    pub fn render_runtime_support(&self) -> Result<RenderedFile, GenerationError> {
        let to_error = |message| GenerationError::Render {
            artifact: self.error.clone(),
            message,
        };
        let error = ident(&self.error.identifier).map_err(to_error)?;
        let malformed = ident(&self.malformed.identifier).map_err(to_error)?;

        let code = quote! {
            //! Errors raised by generated parse functions
            //! @generated

            #![allow(missing_docs)]

            #[derive(Debug, Clone, PartialEq, Eq)]
            pub enum #error {
                UnknownEnumValue { enum_name: String, value: String },
                MalformedInputShape { path: String, expected: String, found: String },
            }

            impl ::std::fmt::Display for #error {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    match self {
                        Self::UnknownEnumValue { enum_name, value } => {
                            write!(f, "unknown value `{}` for enum `{}`", value, enum_name)
                        }
                        Self::MalformedInputShape { path, expected, found } => {
                            write!(f, "malformed input at `{}`: expected {}, found {}", path, expected, found)
                        }
                    }
                }
            }

            impl ::std::error::Error for #error {}

            pub fn #malformed(path: &str, expected: &str, found: &::serde_json::Value) -> #error {
                let found = match found {
                    ::serde_json::Value::Null => "null",
                    ::serde_json::Value::Bool(_) => "boolean",
                    ::serde_json::Value::Number(_) => "number",
                    ::serde_json::Value::String(_) => "string",
                    ::serde_json::Value::Array(_) => "list",
                    ::serde_json::Value::Object(_) => "object",
                };
                #error::MalformedInputShape {
                    path: path.to_string(),
                    expected: expected.to_string(),
                    found: found.to_string(),
                }
            }
        };

        Ok(RenderedFile {
            name: file_path(&QualifiedName::new(
                self.error.namespace.clone(),
                "coercion_error",
            )),
            content: format_code(code).map_err(to_error)?,
        })
    }

    fn render_enum(&self, artifact: &ArtifactDescriptor) -> RenderResult<TokenStream> {
        let enum_ident = ident(&artifact.name.identifier)?;
        let error = item_path(&self.error)?;
        let schema_name = artifact.origin.as_str();
        let doc = format!(" Generated from enum `{schema_name}`");

        let values: Vec<&str> = artifact
            .members
            .iter()
            .filter_map(|m| match m {
                Member::Variant { name } => Some(name.as_str()),
                _ => None,
            })
            .collect();

        let mut seen = HashSet::new();
        let mut variants = Vec::with_capacity(values.len());
        for value in &values {
            let variant = convert_enum_variant_name(value, schema_name);
            if !seen.insert(variant.clone()) {
                return Err(format!("enum values map to the same variant `{variant}`"));
            }
            variants.push(ident(&variant)?);
        }

        Ok(quote! {
            //! Generated enum
            //! @generated

            #![allow(missing_docs)]

            #[doc = #doc]
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum #enum_ident {
                #(#variants),*
            }

            impl #enum_ident {
                /// Schema spelling of every value
                pub const VALUES: &'static [&'static str] = &[#(#values),*];

                /// Schema spelling of this value
                pub fn as_str(&self) -> &'static str {
                    match self {
                        #(Self::#variants => #values,)*
                    }
                }
            }

            impl ::std::str::FromStr for #enum_ident {
                type Err = #error;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    match s {
                        #(#values => Ok(Self::#variants),)*
                        other => Err(#error::UnknownEnumValue {
                            enum_name: #schema_name.to_string(),
                            value: other.to_string(),
                        }),
                    }
                }
            }
        })
    }

    fn render_record(&self, artifact: &ArtifactDescriptor) -> RenderResult<TokenStream> {
        let record_ident = ident(&artifact.name.identifier)?;
        let generics = self.generics(artifact)?;
        let doc = origin_doc(artifact);

        let mut fields = Vec::new();
        for member in &artifact.members {
            if let Member::Field { name, ty } = member {
                let field = field_ident(name)?;
                let ty = self.type_tokens(ty)?;
                fields.push(quote! { pub #field: #ty });
            }
        }

        Ok(quote! {
            //! Generated record
            //! @generated

            #![allow(missing_docs)]

            #[doc = #doc]
            #[derive(Debug, Clone)]
            pub struct #record_ident #generics {
                #(#fields),*
            }
        })
    }

    fn render_interface(&self, artifact: &ArtifactDescriptor) -> RenderResult<TokenStream> {
        let trait_ident = ident(&artifact.name.identifier)?;
        let doc = origin_doc(artifact);

        let mut methods = Vec::new();
        for member in &artifact.members {
            if let Member::Method {
                name,
                params,
                returns,
            } = member
            {
                let method = field_ident(name)?;
                let params = self.params(params)?;
                let returns = self.type_tokens(returns)?;
                methods.push(quote! {
                    fn #method(&self #(, #params)*) -> #returns;
                });
            }
        }

        Ok(quote! {
            //! Generated contract
            //! @generated

            #![allow(missing_docs)]

            #[doc = #doc]
            pub trait #trait_ident {
                #(#methods)*
            }
        })
    }

    fn render_function(&self, artifact: &ArtifactDescriptor) -> RenderResult<TokenStream> {
        let (params, _, body) = artifact
            .function()
            .ok_or_else(|| "function artifact without a body".to_string())?;
        let fn_ident = ident(&artifact.name.identifier)?;
        let doc = origin_doc(artifact);

        let item = match body {
            FunctionBody::BuildRecord { record, fields } => {
                let param = params
                    .first()
                    .ok_or_else(|| "parse function without an input parameter".to_string())?;
                self.render_build_record(&fn_ident, &param.name, record, fields)?
            }
            FunctionBody::BuildConnection {
                node,
                edge,
                connection,
                page_info,
            } => {
                let param = params
                    .first()
                    .ok_or_else(|| "connection builder without a page parameter".to_string())?;
                let page = field_ident(&param.name)?;
                let page_ty = self.type_tokens(&param.ty)?;
                let node = self.type_tokens(node)?;
                let edge = item_path(edge)?;
                let connection = item_path(connection)?;
                let page_info = item_path(page_info)?;
                quote! {
                    pub fn #fn_ident(#page: #page_ty, cursor_of: impl Fn(&#node) -> String) -> #connection {
                        let edges: Vec<#edge> = #page
                            .data
                            .into_iter()
                            .map(|node| #edge { cursor: cursor_of(&node), node })
                            .collect();
                        let page_info = #page_info {
                            has_next_page: #page.has_next_page,
                            has_previous_page: #page.has_previous_page,
                            start_cursor: edges.first().map(|e| e.cursor.clone()),
                            end_cursor: edges.last().map(|e| e.cursor.clone()),
                        };
                        #connection { edges, page_info }
                    }
                }
            }
        };

        Ok(quote! {
            //! Generated function
            //! @generated

            #![allow(missing_docs)]
            #![allow(clippy::redundant_closure)]

            #[doc = #doc]
            #item
        })
    }

    fn render_build_record(
        &self,
        fn_ident: &Ident,
        param: &str,
        record: &QualifiedName,
        fields: &[FieldCoercion],
    ) -> RenderResult<TokenStream> {
        let input = field_ident(param)?;
        let record = item_path(record)?;
        let error = item_path(&self.error)?;
        let malformed = item_path(&self.malformed)?;
        let keys: Vec<&str> = fields.iter().map(|f| f.key.as_str()).collect();

        let mut inits = Vec::with_capacity(fields.len());
        for field in fields {
            let name = field_ident(&field.key)?;
            let key = field.key.as_str();
            let value = self.render_chain(&field.chain, key, quote! { object.get(#key) })?;
            inits.push(quote! { #name: #value });
        }

        Ok(quote! {
            pub fn #fn_ident(#input: &::serde_json::Value) -> Result<#record, #error> {
                const FIELDS: &[&str] = &[#(#keys),*];
                let object = #input
                    .as_object()
                    .ok_or_else(|| #malformed("$", "object", #input))?;
                if let Some(unknown) = object.keys().find(|k| !FIELDS.contains(&k.as_str())) {
                    return Err(#error::MalformedInputShape {
                        path: format!("$.{}", unknown),
                        expected: "a known field".to_string(),
                        found: "unknown field".to_string(),
                    });
                }
                Ok(#record {
                    #(#inits),*
                })
            }
        })
    }

    /// One closure per step, `step_0` innermost, applied to `source`
    /// (an `Option<&serde_json::Value>`)
    fn render_chain(
        &self,
        chain: &CoercionChain,
        key: &str,
        source: TokenStream,
    ) -> RenderResult<TokenStream> {
        let error = item_path(&self.error)?;
        let path = format!("$.{key}");

        let mut defs = Vec::with_capacity(chain.steps.len());
        for (index, step) in chain.steps.iter().enumerate() {
            let name = format_ident!("step_{}", index);
            let inner = index.checked_sub(1).map(|i| format_ident!("step_{}", i));
            let body = self.render_step(step, inner.as_ref(), &path)?;
            defs.push(quote! {
                let #name = |v: &::serde_json::Value| -> Result<_, #error> { #body };
            });
        }

        let last = chain
            .steps
            .len()
            .checked_sub(1)
            .map(|i| format_ident!("step_{}", i))
            .ok_or_else(|| format!("empty coercion chain for `{key}`"))?;

        let value = match chain.presence {
            Presence::Plain => quote! {
                #last(#source.unwrap_or(&::serde_json::Value::Null))?
            },
            Presence::Boxed => {
                let value_box = item_path(&self.value_box)?;
                quote! {
                    match #source {
                        None => None,
                        Some(v) => Some(#value_box { value: #last(v)? }),
                    }
                }
            }
        };

        Ok(quote! {
            {
                #(#defs)*
                #value
            }
        })
    }

    fn render_step(
        &self,
        step: &CoercionStep,
        inner: Option<&Ident>,
        path: &str,
    ) -> RenderResult<TokenStream> {
        let malformed = item_path(&self.malformed)?;
        let wrapped_inner = || inner.ok_or_else(|| "wrapper step without an inner step".to_string());

        let (converted, nullable) = match step {
            CoercionStep::NonNull => {
                let inner = wrapped_inner()?;
                return Ok(quote! {
                    if v.is_null() {
                        return Err(#malformed(#path, "non-null value", v));
                    }
                    #inner(v)
                });
            }
            CoercionStep::MapList { nullable, .. } => {
                let inner = wrapped_inner()?;
                let converted = quote! {
                    v.as_array()
                        .ok_or_else(|| #malformed(#path, "list", v))?
                        .iter()
                        .map(|item| #inner(item))
                        .collect::<Result<Vec<_>, _>>()?
                };
                (converted, *nullable)
            }
            CoercionStep::Cast {
                target,
                shape,
                nullable,
            } => {
                let target_ty = self.base_tokens(target)?;
                let extract = match shape {
                    ScalarShape::String => quote! { v.as_str().map(|s| <#target_ty>::from(s.to_string())) },
                    ScalarShape::Id => quote! {
                        v.as_str()
                            .map(|s| s.to_string())
                            .or_else(|| v.as_i64().map(|i| i.to_string()))
                            .map(<#target_ty>::from)
                    },
                    ScalarShape::Boolean => quote! { v.as_bool().map(<#target_ty>::from) },
                    ScalarShape::Integer { .. } => quote! {
                        v.as_i64().and_then(|i| <#target_ty>::try_from(i).ok())
                    },
                    ScalarShape::Float => quote! { v.as_f64().map(<#target_ty>::from) },
                    ScalarShape::Numeric => quote! {
                        (v.is_number() || v.is_string())
                            .then(|| ::serde_json::from_value::<#target_ty>(v.clone()).ok())
                            .flatten()
                    },
                    ScalarShape::Any if *target == BaseType::Unknown => quote! { Some(v.clone()) },
                    ScalarShape::Any => quote! {
                        ::serde_json::from_value::<#target_ty>(v.clone()).ok()
                    },
                };
                let expected = shape.describe();
                let converted = quote! {
                    #extract.ok_or_else(|| #malformed(#path, #expected, v))?
                };
                (converted, *nullable)
            }
            CoercionStep::ParseEnum {
                target, nullable, ..
            } => {
                let target_ty = self.base_tokens(target)?;
                let converted = quote! {
                    v.as_str()
                        .ok_or_else(|| #malformed(#path, "enum value", v))?
                        .parse::<#target_ty>()?
                };
                (converted, *nullable)
            }
            CoercionStep::BuildInput {
                builder, nullable, ..
            } => {
                let builder = item_path(builder)?;
                (quote! { #builder(v)? }, *nullable)
            }
        };

        Ok(if nullable {
            quote! {
                if v.is_null() {
                    return Ok(None);
                }
                Ok(Some(#converted))
            }
        } else {
            quote! { Ok(#converted) }
        })
    }

    fn generics(&self, artifact: &ArtifactDescriptor) -> RenderResult<TokenStream> {
        let params = artifact
            .type_params()
            .map(ident)
            .collect::<RenderResult<Vec<_>>>()?;
        Ok(if params.is_empty() {
            quote! {}
        } else {
            quote! { <#(#params),*> }
        })
    }

    fn params(&self, params: &[Param]) -> RenderResult<Vec<TokenStream>> {
        params
            .iter()
            .map(|p| {
                let name = field_ident(&p.name)?;
                let ty = self.type_tokens(&p.ty)?;
                Ok(quote! { #name: #ty })
            })
            .collect()
    }

    fn type_tokens(&self, ty: &TargetType) -> RenderResult<TokenStream> {
        let mut tokens = self.base_tokens(&ty.base)?;
        if ty.nullable {
            tokens = quote! { Option<#tokens> };
        }
        for wrapper in ty.wrapping.iter().rev() {
            tokens = match wrapper.kind {
                WrapperKind::List => quote! { Vec<#tokens> },
                WrapperKind::Box => {
                    let value_box = item_path(&self.value_box)?;
                    quote! { #value_box<#tokens> }
                }
            };
            if wrapper.nullable {
                tokens = quote! { Option<#tokens> };
            }
        }
        Ok(tokens)
    }

    fn base_tokens(&self, base: &BaseType) -> RenderResult<TokenStream> {
        Ok(match base {
            BaseType::Builtin(ty) | BaseType::External(ty) => {
                let parsed: syn::Type =
                    syn::parse_str(ty).map_err(|e| format!("invalid type `{ty}`: {e}"))?;
                quote! { #parsed }
            }
            BaseType::Generated(name) => item_path(name)?,
            BaseType::Unknown => quote! { ::serde_json::Value },
            BaseType::Param(name) => {
                let param = ident(name)?;
                quote! { #param }
            }
            BaseType::Instance { name, args } => {
                let path = item_path(name)?;
                let args = args
                    .iter()
                    .map(|a| self.type_tokens(a))
                    .collect::<RenderResult<Vec<_>>>()?;
                quote! { #path<#(#args),*> }
            }
        })
    }
}

/// `mod.rs` for every directory containing rendered files
fn module_files(files: &[RenderedFile]) -> RenderResult<Vec<RenderedFile>> {
    // dir -> (child modules, child files)
    let mut tree: BTreeMap<String, (BTreeSet<String>, BTreeSet<String>)> = BTreeMap::new();

    for file in files {
        let Some(stem) = file.name.strip_suffix(".rs") else {
            continue;
        };
        let (dir, module) = stem.rsplit_once('/').unwrap_or(("", stem));
        tree.entry(dir.to_string()).or_default().1.insert(module.to_string());

        let mut current = dir;
        while let Some((parent, child)) = current.rsplit_once('/') {
            tree.entry(parent.to_string()).or_default().0.insert(child.to_string());
            current = parent;
        }
    }

    let mut out = Vec::new();
    for (dir, (dirs, modules)) in &tree {
        if dir.is_empty() {
            continue;
        }
        let dir_idents = dirs.iter().map(|d| ident(d)).collect::<RenderResult<Vec<_>>>()?;
        let file_idents = modules.iter().map(|m| ident(m)).collect::<RenderResult<Vec<_>>>()?;

        let code = quote! {
            //! Generated module tree
            //! @generated

            #(pub mod #dir_idents;)*
            #(pub mod #file_idents;)*

            #(pub use #file_idents::*;)*
        };
        out.push(RenderedFile {
            name: format!("{dir}/mod.rs"),
            content: format_code(code)?,
        });
    }
    Ok(out)
}

fn file_path(name: &QualifiedName) -> String {
    let mut path: Vec<String> = name.segments().map(str::to_string).collect();
    path.push(format!("{}.rs", name.identifier.to_snake_case()));
    path.join("/")
}

/// Absolute path of a generated item: `crate::ns::...::Ident`
fn item_path(name: &QualifiedName) -> RenderResult<TokenStream> {
    let segments = name.segments().map(ident).collect::<RenderResult<Vec<_>>>()?;
    let item = ident(&name.identifier)?;
    Ok(quote! { crate #(:: #segments)* :: #item })
}

fn origin_doc(artifact: &ArtifactDescriptor) -> String {
    if artifact.origin.is_empty() {
        " Generated support type".to_string()
    } else {
        format!(" Generated from `{}`", artifact.origin)
    }
}

fn field_ident(name: &str) -> RenderResult<Ident> {
    ident(&name.to_snake_case())
}

/// Build an identifier, escaping Rust keywords
fn ident(name: &str) -> RenderResult<Ident> {
    const RUST_KEYWORDS: &[&str] = &[
        "as", "break", "const", "continue", "else", "enum", "extern", "false", "fn", "for",
        "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref",
        "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where",
        "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final", "macro",
        "override", "priv", "typeof", "unsized", "virtual", "yield", "try",
    ];

    if matches!(name, "self" | "Self" | "super" | "crate") {
        return Ok(format_ident!("{}_", name));
    }
    if RUST_KEYWORDS.contains(&name) {
        return Ok(format_ident!("r#{}", name));
    }
    syn::parse_str::<Ident>(name).map_err(|e| format!("invalid identifier `{name}`: {e}"))
}

/// Convert a schema enum value to a Rust variant name
///
/// Values conventionally use SCREAMING_SNAKE_CASE, sometimes prefixed with
/// the enum name (e.g. `ORDER_STATUS_OPEN` in `OrderStatus`); the prefix is
/// stripped unless that would leave a leading digit.
fn convert_enum_variant_name(value: &str, enum_name: &str) -> String {
    let prefix = format!("{}_", enum_name.to_shouty_snake_case());
    let stripped = value
        .strip_prefix(&prefix)
        .filter(|rest| rest.chars().next().is_some_and(|c| c.is_ascii_alphabetic()))
        .unwrap_or(value);
    stripped.to_upper_camel_case()
}

/// Format generated tokens with prettyplease
fn format_code(tokens: TokenStream) -> RenderResult<String> {
    let code = tokens.to_string();
    let parsed =
        syn::parse_file(&code).map_err(|e| format!("failed to parse generated code: {e}"))?;
    Ok(prettyplease::unparse(&parsed))
}
