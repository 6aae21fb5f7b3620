// SPDX-License-Identifier: Apache-2.0
// Copyright RINA Core Authors

//! `#[concurrency::test]`: write the test body once, run it under plain
//! threads, `loom`, or `shuttle` depending on which of this crate's
//! features the workspace enabled for the current build.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use proc_macro_crate::{FoundCrate, crate_name};
use quote::quote;
use syn::{ItemFn, parse_macro_input};

/// Resolves how the current crate imports `rina-concurrency`, so the
/// expansion works whether the consumer depends on it as `concurrency`
/// (the workspace alias) or under its published name.
fn concurrency_path() -> TokenStream2 {
    match crate_name("rina-concurrency") {
        Ok(FoundCrate::Itself) => quote!(crate),
        Ok(FoundCrate::Name(name)) => {
            let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
            quote!(::#ident)
        }
        Err(_) => quote!(::concurrency),
    }
}

/// Run `fn body` under a plain `#[test]`, `loom::model`, or one of
/// shuttle's schedulers, selected by this crate's own `loom`/`shuttle`
/// features (which the `rina-concurrency` crate forwards from its own
/// `loom`/`shuttle`/`shuttle_pct`/`shuttle_dfs` features). A single test
/// body is therefore exercised by whichever model checker CI has asked
/// for, with zero iteration-count/scheduler boilerplate at the call site.
#[proc_macro_attribute]
pub fn test(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let name = &sig.ident;

    #[cfg(feature = "silence_clippy")]
    let allow_unused = quote!(#[allow(clippy::missing_const_for_fn)]);
    #[cfg(not(feature = "silence_clippy"))]
    let allow_unused = quote!();

    let expanded = if cfg!(feature = "loom") {
        let krate = concurrency_path();
        quote! {
            #(#attrs)*
            #allow_unused
            #[test]
            #vis fn #name() {
                #krate::loom_sys::model(move || #block);
            }
        }
    } else if cfg!(feature = "shuttle") {
        let krate = concurrency_path();
        quote! {
            #(#attrs)*
            #allow_unused
            #[test]
            #vis fn #name() {
                #krate::shuttle_sys::check(move || #block);
            }
        }
    } else {
        quote! {
            #(#attrs)*
            #allow_unused
            #[test]
            #sig #block
        }
    };

    expanded.into()
}
