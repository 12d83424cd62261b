fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Client only, shares the server's proto definition
    tonic_prost_build::configure()
        .build_server(false)
        .build_client(true)
        .compile_protos(&["../blog-server/proto/blog.proto"], &["../blog-server/proto"])?;
    Ok(())
}
