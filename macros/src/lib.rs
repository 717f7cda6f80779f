// SPDX-License-Identifier: Apache-2.0

//! Procedural macros for the tinyunit test harness.
//!
//! Both attributes register the annotated function into tinyunit's
//! distributed registration slices, so declaring a test is enough to have
//! it picked up by the runner. No master list exists anywhere.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{Error, ItemFn, Path, parse_macro_input};

/// Declare a stateless test case.
///
/// The attribute argument names the module the test belongs to; the
/// function must take the test handle as its only argument.
///
/// # Example
///
/// ```rust
/// use tinyunit::{def_test, expect_eq};
///
/// #[def_test(arithmetic)]
/// fn adds_small_numbers(t: &mut tinyunit::TestCase) {
///     expect_eq!(t, 2 + 2, 4);
/// }
/// ```
#[proc_macro_attribute]
pub fn def_test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let module = match syn::parse::<syn::Ident>(attr) {
        Ok(ident) => ident,
        Err(_) => {
            return Error::new(
                Span::call_site(),
                "expect a module name: `#[def_test(my_module)]`",
            )
            .to_compile_error()
            .into();
        }
    };
    let input = parse_macro_input!(item as ItemFn);

    if input.sig.inputs.len() != 1 {
        return Error::new(
            Span::call_site(),
            "expect the test handle as the only argument: `fn name(t: &mut TestCase)`",
        )
        .to_compile_error()
        .into();
    }
    if let syn::ReturnType::Type(..) = input.sig.output {
        return Error::new(Span::call_site(), "expect no return value for a test function")
            .to_compile_error()
            .into();
    }

    let fn_name = &input.sig.ident;
    let fn_name_str = fn_name.to_string();
    let module_str = module.to_string();
    let entry_ident = format_ident!("__TINYUNIT_TEST_{}", fn_name_str.to_uppercase());
    let name_ident = format_ident!("__TINYUNIT_NAME_{}", fn_name_str.to_uppercase());
    let pretty = fn_name_str.replace('_', " ");

    let output = quote! {
        #input

        #[tinyunit::linkme::distributed_slice(tinyunit::TESTS)]
        #[linkme(crate = tinyunit::linkme)]
        #[allow(non_upper_case_globals)]
        static #entry_ident: tinyunit::TestEntry =
            tinyunit::TestEntry::stateless(#module_str, #fn_name_str, #fn_name);

        #[tinyunit::linkme::distributed_slice(tinyunit::DISPLAY_NAMES)]
        #[linkme(crate = tinyunit::linkme)]
        #[allow(non_upper_case_globals)]
        static #name_ident: tinyunit::NameEntry =
            tinyunit::NameEntry::new(#fn_name_str, #pretty);
    };

    output.into()
}

/// Declare a fixture-backed test case.
///
/// The attribute argument names the fixture type, which must implement
/// [`Default`] and tinyunit's `Fixture` trait. Tests annotated with the
/// same fixture type form one module and share a single instance per run.
///
/// # Example
///
/// ```rust
/// use tinyunit::{def_fixture_test, expect_eq};
///
/// #[derive(Default)]
/// struct Counter {
///     hits: u32,
/// }
///
/// impl tinyunit::Fixture for Counter {}
///
/// #[def_fixture_test(Counter)]
/// fn starts_at_zero(t: &mut tinyunit::TestCase, f: &mut Counter) {
///     expect_eq!(t, f.hits, 0);
/// }
/// ```
#[proc_macro_attribute]
pub fn def_fixture_test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let fixture = match syn::parse::<Path>(attr) {
        Ok(path) => path,
        Err(_) => {
            return Error::new(
                Span::call_site(),
                "expect a fixture type: `#[def_fixture_test(MyFixture)]`",
            )
            .to_compile_error()
            .into();
        }
    };
    let input = parse_macro_input!(item as ItemFn);

    if input.sig.inputs.len() != 2 {
        return Error::new(
            Span::call_site(),
            "expect the test handle and the fixture: `fn name(t: &mut TestCase, f: &mut MyFixture)`",
        )
        .to_compile_error()
        .into();
    }
    if let syn::ReturnType::Type(..) = input.sig.output {
        return Error::new(Span::call_site(), "expect no return value for a test function")
            .to_compile_error()
            .into();
    }

    let Some(last) = fixture.segments.last() else {
        return Error::new(Span::call_site(), "expect a non-empty fixture type path")
            .to_compile_error()
            .into();
    };
    let module_str = last.ident.to_string();

    let fn_name = &input.sig.ident;
    let fn_name_str = fn_name.to_string();
    let shim_ident = format_ident!("__tinyunit_body_{}", fn_name_str);
    let entry_ident = format_ident!("__TINYUNIT_TEST_{}", fn_name_str.to_uppercase());
    let name_ident = format_ident!("__TINYUNIT_NAME_{}", fn_name_str.to_uppercase());
    let pretty = fn_name_str.replace('_', " ");

    let output = quote! {
        #input

        fn #shim_ident(t: &mut tinyunit::TestCase, raw: &mut dyn ::core::any::Any) {
            match raw.downcast_mut::<#fixture>() {
                Some(f) => #fn_name(t, f),
                None => unreachable!("fixture type mismatch for `{}`", #fn_name_str),
            }
        }

        #[tinyunit::linkme::distributed_slice(tinyunit::TESTS)]
        #[linkme(crate = tinyunit::linkme)]
        #[allow(non_upper_case_globals)]
        static #entry_ident: tinyunit::TestEntry =
            tinyunit::TestEntry::fixture::<#fixture>(#module_str, #fn_name_str, #shim_ident);

        #[tinyunit::linkme::distributed_slice(tinyunit::DISPLAY_NAMES)]
        #[linkme(crate = tinyunit::linkme)]
        #[allow(non_upper_case_globals)]
        static #name_ident: tinyunit::NameEntry =
            tinyunit::NameEntry::new(#fn_name_str, #pretty);
    };

    output.into()
}
