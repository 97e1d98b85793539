use loggly_target::app;

fn main() -> anyhow::Result<()> {
    app::main()
}
