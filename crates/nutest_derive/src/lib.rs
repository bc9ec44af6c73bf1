//! Macros that make user types visible to the nutest harness.
//!
//! - `Record`: converts a struct to and from the harness `Value` model so it can be passed to and returned from
//!   invoked methods, compared structurally, and printed in narratives.
//! - `subject`: placed on an inherent `impl` block, registers its `&self` methods in a reflection table so the
//!   harness can resolve them by name and argument types, and discover the test methods among them.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, ItemImpl, parse_macro_input};

mod subject;

/// Implements `ToValue`, `FromValue` and `Typed` for a struct.
///
/// # Example
/// ```ignore
/// #[derive(Record)]
/// struct Book {
///     title: String,
///     pages: i32,
/// }
///
/// // Book { title: "HtDP".into(), pages: 300 }.to_value()
/// // renders as: Book { title: "HtDP", pages: 300 }
/// ```
#[proc_macro_derive(Record)]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let name_str = name.to_string();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return syn::Error::new_spanned(name, "`Record` can only be derived for structs")
                .into_compile_error()
                .into();
        }
    };

    // (label, member) pairs; tuple fields are labelled by position.
    let members: Vec<(String, syn::Member)> = match fields {
        Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|f| f.ident.clone())
            .map(|ident| (ident.to_string(), syn::Member::Named(ident)))
            .collect(),
        Fields::Unnamed(unnamed) => (0..unnamed.unnamed.len())
            .map(|i| (i.to_string(), syn::Member::Unnamed(syn::Index::from(i))))
            .collect(),
        Fields::Unit => vec![],
    };
    let labels: Vec<&String> = members.iter().map(|(label, _)| label).collect();
    let accessors: Vec<&syn::Member> = members.iter().map(|(_, member)| member).collect();

    let construct = match fields {
        Fields::Named(_) => quote! {
            Self { #( #accessors: ::nutest::value::field(__fields, #labels)?, )* }
        },
        Fields::Unnamed(_) => quote! {
            Self( #( ::nutest::value::field(__fields, #labels)?, )* )
        },
        Fields::Unit => quote! { Self },
    };

    let to_generics = bounded(&input.generics, quote!(::nutest::value::ToValue));
    let from_generics = bounded(&input.generics, quote!(::nutest::value::FromValue));
    let (to_impl, to_ty, to_where) = to_generics.split_for_impl();
    let (from_impl, from_ty, from_where) = from_generics.split_for_impl();
    let (typed_impl, typed_ty, typed_where) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #to_impl ::nutest::value::ToValue for #name #to_ty #to_where {
            fn to_value(&self) -> ::nutest::value::Value {
                ::nutest::value::Value::Record {
                    class: ::std::string::String::from(#name_str),
                    fields: ::std::vec![
                        #( (::std::string::String::from(#labels), ::nutest::value::ToValue::to_value(&self.#accessors)), )*
                    ],
                }
            }
        }

        impl #from_impl ::nutest::value::FromValue for #name #from_ty #from_where {
            fn from_value(value: &::nutest::value::Value) -> ::std::result::Result<Self, ::nutest::fault::Fault> {
                #[allow(unused_variables)]
                let __fields = ::nutest::value::record_fields(value, #name_str)?;
                ::std::result::Result::Ok(#construct)
            }
        }

        impl #typed_impl ::nutest::value::Typed for #name #typed_ty #typed_where {
            fn type_desc() -> ::nutest::types::TypeDesc {
                ::nutest::types::TypeDesc::named(#name_str)
            }
        }
    };

    TokenStream::from(expanded)
}

/// Registers the `&self` methods of an inherent `impl` block with the harness.
///
/// Options (all optional):
/// - `name = "..."`: class name used in resolution and reports (defaults to the type name)
/// - `extends = Parent, via = field`: inherit `Parent`'s registered methods, reached through `self.field`
/// - `examples`: the type implements `Examples`, which takes precedence over convention discovery
/// - `inspect`: render the subject through its `Record` derive instead of as `<Name>`
///
/// Methods taking `&mut Tester` are test methods; mark others with `#[test_method]` to have them discovered
/// regardless of their name.
///
/// # Example
/// ```ignore
/// #[subject(inspect)]
/// impl Account {
///     pub fn deposit(&self, amount: i64) -> i64 { self.balance + amount }
///
///     fn test_deposit(&self, t: &mut Tester) {
///         t.check_expect(self.deposit(5), 15i64);
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn subject(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut options = subject::SubjectOptions::default();
    let parser = syn::meta::parser(|meta| options.parse(meta));
    parse_macro_input!(attr with parser);
    let item = parse_macro_input!(item as ItemImpl);

    subject::expand(options, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn bounded(generics: &syn::Generics, bound: proc_macro2::TokenStream) -> syn::Generics {
    let mut generics = generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(syn::parse_quote!(#bound));
    }
    generics
}
