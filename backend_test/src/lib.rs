use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a Rocket async test and inject dependencies.
///
/// A fresh server is built for every test from `crate::test_figment()`, so each
/// test gets its own freshly deployed ballot.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`] (as
/// `Client`) and the server's `crate::model::chain::Chain` (as `Chain`).
///
/// Passing `chairperson` or `voter` as the attribute argument logs the client
/// in as the chairperson or as the example voter before the test runs.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract the injected arguments and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Log in the client if needed.
    let login_as = parse_macro_input!(args as Option<Ident>);
    let credentials = match login_as {
        Some(arg) if arg == "chairperson" => Some(quote! {
            crate::model::api::session::AccountCredentials::chairperson_example()
        }),
        Some(arg) if arg == "voter" => Some(quote! {
            crate::model::api::session::AccountCredentials::example()
        }),
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected `chairperson` or `voter`")
                .into_compile_error()
                .into();
        }
        None => None,
    };
    let maybe_login = credentials
        .map(|credentials| {
            // Scoped so the response's borrow of the client ends before the
            // client is moved into the test.
            quote! {
                {
                    let response = rocket_client
                        .post(uri!(crate::api::auth::login))
                        .header(rocket::http::ContentType::JSON)
                        .body(rocket::serde::json::json!(#credentials).to_string())
                        .dispatch()
                        .await;
                    assert_eq!(response.status(), rocket::http::Status::Ok, "test login failed");
                }
            }
        })
        .unwrap_or_default();

    // Rewrite the test function.
    quote! {
        #[rocket::async_test]
        async fn #name() {
            /// The test itself.
            #item_fn

            let rocket_client = rocket::local::asynchronous::Client::tracked(
                crate::rocket_for_figment(crate::test_figment())
            )
            .await
            .unwrap();
            let _chain = rocket_client
                .rocket()
                .state::<crate::model::chain::Chain>()
                .unwrap()
                .clone();

            #maybe_login

            #new_name(#(#test_args),*).await;
        }
    }
    .into()
}

/// Ensure the wrapped test is async and map each parameter to the value injected for it.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_chain = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let Pat::Ident(_) = &*pat_type.pat {
                if let Type::Path(type_path) = &*pat_type.ty {
                    if let Some(type_ident) = type_path.path.get_ident() {
                        if type_ident == "Client" {
                            if has_client {
                                return Err(syn::Error::new(input.span(), "Test cannot accept more than one `rocket::local::asynchronous::Client`"));
                            }
                            has_client = true;
                            args.push(quote! { rocket_client });
                            continue;
                        } else if type_ident == "Chain" {
                            if has_chain {
                                return Err(syn::Error::new(
                                    input.span(),
                                    "Test cannot accept more than one `Chain`",
                                ));
                            }
                            has_chain = true;
                            args.push(quote! { _chain.clone() });
                            continue;
                        }
                    }
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client` or `chain_ident: Chain`",
        ));
    }

    Ok(args)
}
