fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Point prost at a vendored protoc binary if one isn't on PATH, so the
    // build doesn't depend on a system-installed protobuf compiler.
    if std::env::var_os("PROTOC").is_none() {
        if let Ok(protoc) = protoc_bin_vendored::protoc_bin_path() {
            std::env::set_var("PROTOC", protoc);
        }
    }

    // Generate gRPC stubs from the vendored Terraform plugin protocol
    tonic_prost_build::configure()
        .compile_protos(&["vendor/proto/tfplugin6.proto"], &["vendor/proto"])?;

    println!("cargo:rerun-if-changed=vendor/proto/tfplugin6.proto");

    Ok(())
}
