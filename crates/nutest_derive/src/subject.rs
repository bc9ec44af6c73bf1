//! Expansion of `#[subject]`.

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::meta::ParseNestedMeta;
use syn::{FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr, ReturnType, Type};

#[derive(Default)]
pub(crate) struct SubjectOptions {
    name: Option<LitStr>,
    extends: Option<Type>,
    via: Option<Ident>,
    examples: bool,
    inspect: bool,
}

impl SubjectOptions {
    pub(crate) fn parse(&mut self, meta: ParseNestedMeta) -> syn::Result<()> {
        if meta.path.is_ident("name") {
            self.name = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("extends") {
            self.extends = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("via") {
            self.via = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("examples") {
            self.examples = true;
        } else if meta.path.is_ident("inspect") {
            self.inspect = true;
        } else {
            return Err(meta.error("unsupported subject option; expected `name`, `extends`, `via`, `examples` or `inspect`"));
        }
        Ok(())
    }
}

/// How a declared parameter is decoded from a harness value and handed to the method.
struct Param {
    /// Owned type the argument is decoded into.
    owned: Type,
    /// Pass `&decoded` instead of `decoded`.
    by_ref: bool,
}

enum Shape {
    /// Plain method: decoded arguments in, a `Value` out.
    Plain(Vec<Param>),
    /// Single `&mut Tester` parameter.
    Test,
}

enum Returns {
    Unit,
    Result,
    Other,
}

pub(crate) fn expand(options: SubjectOptions, mut item: ItemImpl) -> syn::Result<TokenStream> {
    if item.trait_.is_some() {
        return Err(syn::Error::new_spanned(&item.self_ty, "`subject` goes on an inherent impl block"));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&item.generics, "generic subjects are not supported"));
    }
    if options.extends.is_some() != options.via.is_some() {
        return Err(syn::Error::new(Span::call_site(), "`extends` and `via` must be given together"));
    }

    let self_ty = (*item.self_ty).clone();
    let class_name = match &options.name {
        Some(lit) => lit.value(),
        None => last_segment(&self_ty)
            .ok_or_else(|| syn::Error::new_spanned(&self_ty, "cannot name this subject; use `name = \"...\"`"))?,
    };

    let mut registrations = Vec::new();
    for impl_item in item.items.iter_mut() {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let marked = strip_test_method_attr(method);
        if let Some(registration) = register(&self_ty, method, marked)? {
            registrations.push(registration);
        }
    }

    let inherit = match (&options.extends, &options.via) {
        (Some(parent), Some(via)) => quote! {
            fn __via(this: &#self_ty) -> &#parent {
                &this.#via
            }
            let builder = builder.extends::<#parent>(__via);
        },
        _ => quote! {},
    };
    let examples = if options.examples {
        quote! { let builder = builder.examples(); }
    } else {
        quote! {}
    };
    let inspect = if options.inspect {
        quote! {
            fn inspect(&self) -> ::nutest::value::Value {
                ::nutest::value::ToValue::to_value(self)
            }
        }
    } else {
        quote! {}
    };

    Ok(quote! {
        #item

        impl ::nutest::reflect::Reflect for #self_ty {
            fn class_info() -> &'static ::nutest::reflect::ClassInfo {
                static INFO: ::std::sync::OnceLock<::nutest::reflect::ClassInfo> = ::std::sync::OnceLock::new();
                INFO.get_or_init(|| {
                    let builder = ::nutest::reflect::ClassBuilder::<#self_ty>::new(#class_name);
                    #( let builder = builder #registrations; )*
                    #inherit
                    #examples
                    builder.build()
                })
            }

            #inspect
        }
    })
}

/// Build the `.method(...)` / `.test(...)` call for one method, or `None` when the method cannot be called
/// reflectively (no `&self` receiver, generic, async, or an unsupported parameter type).
fn register(self_ty: &Type, method: &ImplItemFn, marked: bool) -> syn::Result<Option<TokenStream>> {
    let sig = &method.sig;
    let reflectable = takes_shared_self(method) && sig.generics.params.is_empty() && sig.asyncness.is_none();
    if !reflectable {
        if marked {
            return Err(syn::Error::new_spanned(
                sig,
                "`#[test_method]` requires a non-generic, non-async method taking `&self`",
            ));
        }
        return Ok(None);
    }
    let Some(shape) = shape_of(method) else {
        if marked {
            return Err(syn::Error::new_spanned(sig, "`#[test_method]` parameter types cannot be decoded"));
        }
        return Ok(None);
    };

    let ident = &sig.ident;
    let name = ident.to_string();
    let visibility = match method.vis {
        syn::Visibility::Public(_) => quote!(::nutest::reflect::Visibility::Public),
        _ => quote!(::nutest::reflect::Visibility::Private),
    };
    let returns = returns_of(&sig.output);
    let mark = if marked { quote!(.mark(#name)) } else { quote!() };

    let registration = match shape {
        Shape::Test => {
            let body = match returns {
                Returns::Unit => quote! {
                    __this.#ident(__tester);
                    ::std::result::Result::Ok(())
                },
                Returns::Result => quote! {
                    __this.#ident(__tester).map(|_| ()).map_err(::nutest::fault::Fault::from)
                },
                Returns::Other => quote! {
                    let _ = __this.#ident(__tester);
                    ::std::result::Result::Ok(())
                },
            };
            quote! {
                .test(#name, #visibility, |__this: &#self_ty, __tester: &mut ::nutest::Tester| {
                    #body
                })
                #mark
            }
        }
        Shape::Plain(params) => {
            let arity = params.len();
            let bindings: Vec<Ident> = (0..arity).map(|i| format_ident!("__arg{}", i)).collect();
            let indices = 0..arity;
            let owned: Vec<&Type> = params.iter().map(|p| &p.owned).collect();
            let passes: Vec<TokenStream> = params
                .iter()
                .zip(&bindings)
                .map(|(p, b)| if p.by_ref { quote!(&#b) } else { quote!(#b) })
                .collect();
            let call = quote!(__this.#ident(#(#passes),*));
            let body = match returns {
                Returns::Unit => quote! {
                    #call;
                    ::std::result::Result::Ok(::nutest::value::Value::Null)
                },
                Returns::Result => quote! {
                    match #call {
                        ::std::result::Result::Ok(__ok) => {
                            ::std::result::Result::Ok(::nutest::value::ToValue::to_value(&__ok))
                        }
                        ::std::result::Result::Err(__err) => {
                            ::std::result::Result::Err(::nutest::fault::Fault::from(__err))
                        }
                    }
                },
                Returns::Other => quote! {
                    let __ret = #call;
                    ::std::result::Result::Ok(::nutest::value::ToValue::to_value(&__ret))
                },
            };
            quote! {
                .method(
                    #name,
                    ::std::vec![#( <#owned as ::nutest::value::Typed>::type_desc() ),*],
                    #visibility,
                    |__this: &#self_ty, __args: &[::nutest::value::Value]| {
                        ::nutest::reflect::expect_arity(__args, #arity)?;
                        #( let #bindings = <#owned as ::nutest::value::FromValue>::from_value(&__args[#indices])?; )*
                        #body
                    },
                )
                #mark
            }
        }
    };
    Ok(Some(registration))
}

fn takes_shared_self(method: &ImplItemFn) -> bool {
    match method.sig.inputs.first() {
        Some(FnArg::Receiver(receiver)) => receiver.reference.is_some() && receiver.mutability.is_none(),
        _ => false,
    }
}

fn shape_of(method: &ImplItemFn) -> Option<Shape> {
    let declared: Vec<&Type> = method
        .sig
        .inputs
        .iter()
        .skip(1)
        .filter_map(|arg| match arg {
            FnArg::Typed(pat) => Some(&*pat.ty),
            FnArg::Receiver(_) => None,
        })
        .collect();

    if let [Type::Reference(reference)] = declared.as_slice() {
        if reference.mutability.is_some() && last_segment(&reference.elem).as_deref() == Some("Tester") {
            return Some(Shape::Test);
        }
    }

    declared.into_iter().map(param_of).collect::<Option<Vec<_>>>().map(Shape::Plain)
}

fn param_of(ty: &Type) -> Option<Param> {
    match ty {
        Type::Reference(reference) if reference.mutability.is_some() => None,
        Type::Reference(reference) => {
            let owned: Type = match &*reference.elem {
                Type::Path(path) if path.qself.is_none() && path.path.is_ident("str") => {
                    syn::parse_quote!(::std::string::String)
                }
                Type::Slice(slice) => {
                    let elem = &slice.elem;
                    syn::parse_quote!(::std::vec::Vec<#elem>)
                }
                Type::ImplTrait(_) | Type::TraitObject(_) => return None,
                other => other.clone(),
            };
            Some(Param { owned, by_ref: true })
        }
        Type::ImplTrait(_) | Type::Infer(_) => None,
        other => Some(Param {
            owned: other.clone(),
            by_ref: false,
        }),
    }
}

fn returns_of(output: &ReturnType) -> Returns {
    match output {
        ReturnType::Default => Returns::Unit,
        ReturnType::Type(_, ty) => match &**ty {
            Type::Tuple(tuple) if tuple.elems.is_empty() => Returns::Unit,
            other if last_segment(other).as_deref() == Some("Result") => Returns::Result,
            _ => Returns::Other,
        },
    }
}

/// Remove `#[test_method]` (or a path ending in it) and report whether it was present.
fn strip_test_method_attr(method: &mut ImplItemFn) -> bool {
    let before = method.attrs.len();
    method.attrs.retain(|attr| {
        attr.path()
            .segments
            .last()
            .is_none_or(|segment| segment.ident != "test_method")
    });
    method.attrs.len() != before
}

fn last_segment(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|segment| segment.ident.to_string()),
        Type::Group(group) => last_segment(&group.elem),
        Type::Paren(paren) => last_segment(&paren.elem),
        _ => None,
    }
}
