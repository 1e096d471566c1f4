use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one, inject dependencies,
/// and ensure that the temporary database and server are torn down regardless
/// of how the test terminates.
///
/// Injectable dependencies are [`crate::model::sqlite::Store`],
/// [`crate::client::Client`] (connected to a server on an ephemeral port),
/// [`crate::Backend`], and [`crate::model::election::PhaseScheduler`].
///
/// `#[backend_test(seeded)]` loads the example reference data first.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract type information and reject invalid function signatures.
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

    // Load the example data if asked to.
    let maybe_seed = match parse_macro_input!(args as Option<Ident>) {
        Some(arg) if arg == "seeded" => quote! {
            crate::model::examples::seed(&backend.store().connection().unwrap()).unwrap();
        },
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected no argument or `seeded`")
                .into_compile_error()
                .into();
        }
        None => TokenStream2::new(),
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup() -> (
                tempfile::TempDir,
                crate::Backend,
                crate::client::Client,
                tokio::task::JoinHandle<()>,
            ) {
                log4rs_test_utils::test_logging::init_logging_once_for(
                    ["ems_server"],
                    None,
                    None,
                );

                let dir = tempfile::tempdir().unwrap();
                let config = crate::config::Config::with_database(dir.path().join("ems.sqlite3"));
                let backend = crate::Backend::open(config).await.unwrap();

                #maybe_seed

                let server = crate::server::Server::bind(backend.clone()).await.unwrap();
                let client = crate::client::Client::new(server.local_addr().unwrap());
                let server_handle = tokio::spawn(server.run());

                (dir, backend, client, server_handle)
            }

            /// The test itself.
            #item_fn

            /// Test cleanup.
            async fn cleanup(server_handle: tokio::task::JoinHandle<()>, dir: tempfile::TempDir) {
                server_handle.abort();
                let _ = server_handle.await;
                dir.close().unwrap();
            }

            // Create an async runtime. We need a separate one for inside and
            // outside the `catch_unwind`.
            let outer_runtime = tokio::runtime::Builder::new_multi_thread()
                .thread_name("test-setup-cleanup")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();
            let inner_runtime = tokio::runtime::Builder::new_multi_thread()
                .thread_name("ems-worker-test-thread")
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();

            // Run the setup.
            let (dir, backend, client, server_handle) = outer_runtime.block_on(setup());

            // Run the test, catching any panics.
            // Use mutexes to safely transfer `!UnwindSafe` data.
            let backend_mutex = std::sync::Mutex::new(backend);
            let client_mutex = std::sync::Mutex::new(client);
            let runtime_mutex = std::sync::Mutex::new(inner_runtime);
            let result = std::panic::catch_unwind(|| {
                let backend = backend_mutex.into_inner().unwrap();
                let client = client_mutex.into_inner().unwrap();
                let runtime = runtime_mutex.into_inner().unwrap();

                runtime.block_on(#new_name(#(#test_args),*));
            });

            // Run the cleanup.
            outer_runtime.block_on(cleanup(server_handle, dir));

            // If the test panicked, re-raise the panic.
            if let Err(cause) = result {
                std::panic::panic_any(cause);
            }
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut seen = vec![];
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                if let Some(type_ident) = type_path.path.segments.last().map(|s| &s.ident) {
                    let arg = if type_ident == "Store" {
                        Some(quote! { backend.store().clone() })
                    } else if type_ident == "Client" {
                        Some(quote! { client.clone() })
                    } else if type_ident == "Backend" {
                        Some(quote! { backend.clone() })
                    } else if type_ident == "PhaseScheduler" {
                        Some(quote! { backend.windows().scheduler().clone() })
                    } else {
                        None
                    };
                    if let Some(arg) = arg {
                        if seen.contains(type_ident) {
                            return Err(syn::Error::new(
                                input.span(),
                                format!("Test cannot accept more than one `{type_ident}`"),
                            ));
                        }
                        seen.push(type_ident.clone());
                        args.push(arg);
                        continue;
                    }
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected parameters of type `Store`, `Client`, `Backend` or `PhaseScheduler`",
        ));
    }

    Ok(args)
}
