//! Pipebench Macros
//!
//! Procedural macros for registering benchmark definitions at link time.
//!
//! ## Macros
//!
//! - `#[pipebench::benchmark]` - Register a concrete benchmark function
//! - `#[pipebench::abstract_benchmark]` - Register an abstract definition other benchmarks extend

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{ItemFn, ItemStruct, parse_macro_input};

// ============================================================================
// Attribute Parsing Helpers
// ============================================================================

mod attr {
    use syn::meta::ParseNestedMeta;

    /// Get the attribute name as a string
    pub fn name(meta: &ParseNestedMeta) -> String {
        meta.path
            .get_ident()
            .map(|i| i.to_string())
            .unwrap_or_default()
    }

    /// Parse a string literal attribute: `attr = "value"`
    pub fn string(meta: &ParseNestedMeta) -> syn::Result<String> {
        let value: syn::LitStr = meta.value()?.parse()?;
        Ok(value.value())
    }

    /// Parse a comma-separated string as tags: `tags = "a, b, c"`
    pub fn tags(meta: &ParseNestedMeta) -> syn::Result<Vec<String>> {
        let value: syn::LitStr = meta.value()?.parse()?;
        Ok(value
            .value()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }

    /// Create an unknown attribute error
    pub fn unknown(meta: &ParseNestedMeta, name: &str) -> syn::Error {
        meta.error(format!("unknown attribute: {}", name))
    }
}

/// Common options for both macros
#[derive(Default)]
struct DefConfig {
    name: Option<String>,
    method: Option<String>,
    extends: Option<String>,
    tags: Vec<String>,
    description: String,
}

fn parse_def_config(args: TokenStream2, allow_method: bool) -> syn::Result<DefConfig> {
    let mut config = DefConfig::default();
    if args.is_empty() {
        return Ok(config);
    }

    let parser = syn::meta::parser(|meta| {
        let name = attr::name(&meta);
        match name.as_str() {
            "name" => config.name = Some(attr::string(&meta)?),
            "method" if allow_method => config.method = Some(attr::string(&meta)?),
            "extends" | "parent" => config.extends = Some(attr::string(&meta)?),
            "tags" => config.tags = attr::tags(&meta)?,
            "description" | "desc" => config.description = attr::string(&meta)?,
            _ => return Err(attr::unknown(&meta, &name)),
        }
        Ok(())
    });

    syn::parse::Parser::parse2(parser, args)?;
    Ok(config)
}

/// Register a benchmark function
///
/// The function receives the benchmark context and calls `evaluate()` once
/// per (sub-)benchmark. Its pipelines are named `<name>.<method>[...]`.
///
/// # Example
///
/// ```ignore
/// #[pipebench::benchmark]
/// fn titanic_benchmark(b: &mut Benchmark) -> anyhow::Result<()> {
///     // named "TitanicBenchmark.benchmark"
///     b.evaluate_pipeline(&build_pipeline()?)?;
///     Ok(())
/// }
///
/// // With configuration
/// #[pipebench::benchmark(
///     name = "Suites.Tabular",
///     extends = "TabularFamily",
///     tags = "tabular, nightly"
/// )]
/// fn tabular(b: &mut Benchmark) -> anyhow::Result<()> { ... }
/// ```
#[proc_macro_attribute]
pub fn benchmark(args: TokenStream, item: TokenStream) -> TokenStream {
    let args = TokenStream2::from(args);
    let func = parse_macro_input!(item as ItemFn);

    benchmark_impl(args, func)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn benchmark_impl(args: TokenStream2, func: ItemFn) -> Result<TokenStream2, syn::Error> {
    validate_signature(&func)?;

    let config = parse_def_config(args, true)?;

    let fn_name = &func.sig.ident;
    let wrapper_name = format_ident!("_pipebench_wrapper_{}", fn_name);

    let name = config
        .name
        .unwrap_or_else(|| upper_camel_case(&fn_name.to_string()));
    let method = config.method.unwrap_or_else(|| "benchmark".to_string());
    let parent = option_tokens(config.extends);
    let description = config.description;
    let tags = config.tags.iter().map(|t| quote! { #t });

    Ok(quote! {
        #func

        #[doc(hidden)]
        #[allow(non_snake_case)]
        fn #wrapper_name(
            benchmark: &mut ::pipebench::Benchmark,
        ) -> ::pipebench::internal::anyhow::Result<()> {
            ::core::result::Result::map_err(#fn_name(benchmark), ::core::convert::Into::into)
        }

        ::pipebench::internal::inventory::submit! {
            ::pipebench::BenchmarkDef {
                name: #name,
                method: #method,
                parent: #parent,
                runner_fn: Some(#wrapper_name),
                tags: &[#(#tags),*],
                description: #description,
                file: file!(),
                line: line!(),
                module_path: module_path!(),
            }
        }
    })
}

/// Register an abstract benchmark definition
///
/// Abstract definitions are never run. They exist so that concrete
/// benchmarks can `extends` them and be discovered as a family.
///
/// # Example
///
/// ```ignore
/// #[pipebench::abstract_benchmark(description = "OpenML tabular tasks")]
/// struct TabularFamily;
///
/// #[pipebench::benchmark(extends = "TabularFamily")]
/// fn titanic(b: &mut Benchmark) -> anyhow::Result<()> { ... }
/// ```
#[proc_macro_attribute]
pub fn abstract_benchmark(args: TokenStream, item: TokenStream) -> TokenStream {
    let args = TokenStream2::from(args);
    let input = parse_macro_input!(item as ItemStruct);

    abstract_impl(args, input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn abstract_impl(args: TokenStream2, input: ItemStruct) -> Result<TokenStream2, syn::Error> {
    let config = parse_def_config(args, false)?;

    let name = config.name.unwrap_or_else(|| input.ident.to_string());
    let parent = option_tokens(config.extends);
    let description = config.description;
    let tags = config.tags.iter().map(|t| quote! { #t });

    Ok(quote! {
        #[allow(dead_code)]
        #input

        ::pipebench::internal::inventory::submit! {
            ::pipebench::BenchmarkDef {
                name: #name,
                method: "benchmark",
                parent: #parent,
                runner_fn: None,
                tags: &[#(#tags),*],
                description: #description,
                file: file!(),
                line: line!(),
                module_path: module_path!(),
            }
        }
    })
}

fn option_tokens(value: Option<String>) -> TokenStream2 {
    match value {
        Some(v) => quote! { Some(#v) },
        None => quote! { None },
    }
}

fn validate_signature(func: &ItemFn) -> syn::Result<()> {
    if func.sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(
            func.sig.asyncness,
            "pipebench: benchmark functions must be synchronous",
        ));
    }
    if func.sig.inputs.len() != 1 {
        return Err(syn::Error::new_spanned(
            &func.sig,
            "pipebench: function must take exactly one argument: `&mut Benchmark`",
        ));
    }
    if matches!(func.sig.output, syn::ReturnType::Default) {
        return Err(syn::Error::new_spanned(
            &func.sig,
            "pipebench: function must return a `Result`",
        ));
    }
    Ok(())
}

/// `titanic_benchmark` -> `TitanicBenchmark`
fn upper_camel_case(ident: &str) -> String {
    ident
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
