/// Generated protobuf and gRPC code for Terraform Plugin Protocol v6.
pub mod tfplugin6 {
    include!(concat!(env!("OUT_DIR"), "/tfplugin6.rs"));
}

/// The provider service trait to implement.
pub use tfplugin6::provider_server::Provider;

/// The tonic service wrapper to register on a gRPC server.
pub use tfplugin6::provider_server::ProviderServer;
