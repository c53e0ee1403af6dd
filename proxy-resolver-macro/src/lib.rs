//! Procedural macros for the proxy-resolver event router.
//!
//! This crate provides the `#[path_handler]` attribute macro, which turns an
//! async function taking path parameters as typed arguments into a route
//! handler.
//!
//! # Example
//!
//! ```ignore
//! use proxy_resolver::prelude::*;
//!
//! #[path_handler]
//! async fn get_order(customer: String, id: u64) -> HandlerResult {
//!     Ok(serde_json::json!({ "customer": customer, "id": id }).into())
//! }
//!
//! resolver.get("/customers/<customer>/orders/<id>", RouteOptions::new(), GetOrderHandler)?;
//! ```

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, FnArg, ItemFn, Pat, Type};

/// How one argument of the user's function is filled in.
enum Binding {
    /// The whole request.
    Request,
    /// The invocation context, by reference.
    Context,
    /// A path parameter with the argument's name, parsed with `FromStr`.
    PathParam { name: syn::Ident, ty: Box<Type> },
}

/// The `#[path_handler]` attribute macro.
///
/// Generates a unit struct named after the function (`get_order` becomes
/// `GetOrderHandler`) that implements `Handler`. Each argument is bound by
/// its type and name:
///
/// - an argument of type `Request` receives the request,
/// - an argument of type `&InvocationContext` receives the context,
/// - any other argument is the path parameter of the same name, parsed with
///   `FromStr`. A missing or unparsable parameter answers `400`.
///
/// The function itself is kept as written and can still be called directly.
#[proc_macro_attribute]
pub fn path_handler(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "path_handler takes no arguments",
        )
        .to_compile_error()
        .into();
    }
    let input_fn = parse_macro_input!(input as ItemFn);

    match generate_path_handler(input_fn) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_path_handler(input_fn: ItemFn) -> syn::Result<proc_macro2::TokenStream> {
    if input_fn.sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(
            &input_fn.sig,
            "path_handler must be async",
        ));
    }

    let fn_name = &input_fn.sig.ident;
    let fn_vis = &input_fn.vis;
    let struct_name = format_ident!("{}Handler", to_pascal_case(&fn_name.to_string()));

    let bindings = input_fn
        .sig
        .inputs
        .iter()
        .map(classify)
        .collect::<syn::Result<Vec<_>>>()?;

    let extractions = bindings.iter().filter_map(|binding| match binding {
        Binding::PathParam { name, ty } => {
            let key = name.to_string();
            Some(quote! {
                let #name: #ty = {
                    let raw = __request.path_parameter(#key).ok_or_else(|| {
                        ::proxy_resolver::HandlerError::bad_request(
                            format!("missing path parameter '{}'", #key),
                        )
                    })?;
                    raw.parse().map_err(|_| {
                        ::proxy_resolver::HandlerError::bad_request(
                            format!("invalid path parameter '{}': {}", #key, raw),
                        )
                    })?
                };
            })
        }
        Binding::Request | Binding::Context => None,
    });

    let call_args = bindings.iter().map(|binding| match binding {
        Binding::Request => quote! { __request },
        Binding::Context => quote! { __ctx },
        Binding::PathParam { name, .. } => quote! { #name },
    });

    let expanded = quote! {
        /// Route handler generated from the function of the same name.
        #[derive(Debug, Default, Clone, Copy)]
        #fn_vis struct #struct_name;

        #[::proxy_resolver::async_trait]
        impl ::proxy_resolver::Handler for #struct_name {
            async fn handle(
                &self,
                __request: ::proxy_resolver::Request,
                __ctx: &::proxy_resolver::InvocationContext,
            ) -> ::proxy_resolver::HandlerResult {
                let _ = &__ctx;
                #(#extractions)*
                #fn_name(#(#call_args),*).await
            }
        }

        #input_fn
    };

    Ok(expanded)
}

fn classify(arg: &FnArg) -> syn::Result<Binding> {
    let typed = match arg {
        FnArg::Typed(typed) => typed,
        FnArg::Receiver(receiver) => {
            return Err(syn::Error::new_spanned(
                receiver,
                "path_handler cannot be used on methods",
            ))
        }
    };

    if last_segment_is(&typed.ty, "Request") {
        return Ok(Binding::Request);
    }
    if let Type::Reference(reference) = typed.ty.as_ref() {
        if last_segment_is(&reference.elem, "InvocationContext") {
            return Ok(Binding::Context);
        }
    }

    match typed.pat.as_ref() {
        Pat::Ident(pat) => Ok(Binding::PathParam {
            name: pat.ident.clone(),
            ty: typed.ty.clone(),
        }),
        other => Err(syn::Error::new_spanned(
            other,
            "path parameters must be plain identifiers",
        )),
    }
}

fn last_segment_is(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == name),
        _ => false,
    }
}

/// Convert a snake_case string to PascalCase.
fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(to_pascal_case("get_order"), "GetOrder");
        assert_eq!(to_pascal_case("hello"), "Hello");
    }

    #[test]
    fn test_classify_arguments() {
        let item: ItemFn = syn::parse_quote! {
            async fn f(name: String, req: Request, ctx: &InvocationContext) -> HandlerResult {
                todo!()
            }
        };
        let bindings = item
            .sig
            .inputs
            .iter()
            .map(classify)
            .collect::<syn::Result<Vec<_>>>()
            .unwrap();

        assert!(matches!(&bindings[0], Binding::PathParam { name, .. } if name == "name"));
        assert!(matches!(bindings[1], Binding::Request));
        assert!(matches!(bindings[2], Binding::Context));
    }

    #[test]
    fn test_sync_fn_rejected() {
        let item: ItemFn = syn::parse_quote! {
            fn f() -> HandlerResult { todo!() }
        };
        assert!(generate_path_handler(item).is_err());
    }
}
