//! Provides simple derive macros for type conversions used by the message
//! catalog and the node state machine.
use proc_macro::TokenStream;
use quote::quote;
use syn::{
	parse_macro_input,
	DeriveInput,
};

/// Derive macro to convert a struct into a variant of the `Event` enum.
#[proc_macro_derive(IntoEvent)]
pub fn into_event(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	let name = input.ident;

	let expanded = quote! {
		impl Into<Event> for #name {
			fn into(self) -> Event {
				Event::#name(self)
			}
		}
	};

	TokenStream::from(expanded)
}

/// Derive macro to convert a struct into a variant of the `StateChange` enum.
#[proc_macro_derive(IntoStateChange)]
pub fn into_state_change(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	let name = input.ident;

	let expanded = quote! {
		impl Into<StateChange> for #name {
			fn into(self) -> StateChange {
				StateChange::#name(self)
			}
		}
	};

	TokenStream::from(expanded)
}

/// Derive macro to convert a struct into a variant of the `Message` enum.
#[proc_macro_derive(IntoMessage)]
pub fn into_message(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	let name = input.ident;

	let expanded = quote! {
		impl Into<Message> for #name {
			fn into(self) -> Message {
				Message::#name(self)
			}
		}
	};

	TokenStream::from(expanded)
}
