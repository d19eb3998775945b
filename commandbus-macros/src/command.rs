use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use std::fmt::Display;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Attribute, DeriveInput, LitStr, Result, parse_macro_input};

pub(crate) fn expand(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if let syn::Data::Union(u) = &input.data {
        return compile_error(u.union_token.span(), "#[derive(Command)] only on struct or enum");
    }

    let name = match parse_name(&input.attrs) {
        Ok(Some(lit)) => lit,
        Ok(None) => LitStr::new(&input.ident.unraw().to_string(), input.ident.span()),
        Err(e) => return e.to_compile_error().into(),
    };

    if let Err(reason) = check_name(&name.value()) {
        return compile_error(name.span(), reason);
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::commandbus::command::Command for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;
        }
    };

    TokenStream::from(expanded)
}

fn compile_error(span: Span, message: impl Display) -> TokenStream {
    syn::Error::new(span, message).to_compile_error().into()
}

// 解析 `#[command(name = "...")]`，重复指定视为错误
fn parse_name(attrs: &[Attribute]) -> Result<Option<LitStr>> {
    let mut name: Option<LitStr> = None;

    for attr in attrs.iter().filter(|a| a.path().is_ident("command")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                if name.is_some() {
                    return Err(meta.error("duplicate 'name' specified"));
                }
                name = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unsupported command attribute, expected `name`"))
            }
        })?;
    }

    Ok(name)
}

// 与运行时的 validate_command_name 保持一致
fn check_name(name: &str) -> std::result::Result<(), &'static str> {
    let mut chars = name.chars();
    match chars.next() {
        None => Err("command name is empty"),
        Some(c) if !c.is_ascii_alphabetic() => Err("command name must start with an ASCII letter"),
        Some(_) if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') => {
            Err("command name may only contain ASCII letters, digits or '_'")
        }
        Some(_) => Ok(()),
    }
}
