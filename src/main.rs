fn main() -> anyhow::Result<()> {
    // Quiet the GPU stack unless RUST_LOG overrides it.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,wgpu_core=warn,wgpu_hal=warn,naga=warn"),
    )
    .init();
    mossblade::platform_winit::run()
}
