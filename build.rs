fn main() {
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }
    let mut resource = winresource::WindowsResource::new();
    resource
        .set("ProductName", "Icon Generator")
        .set("FileDescription", "Resize images and generate flat placeholder icons");
    if let Err(err) = resource.compile() {
        println!("cargo:warning=failed to embed windows resources: {err}");
    }
}
