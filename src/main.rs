use schema_resolve::{cli, logging};

fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let command_line_interface = cli::CommandLineInterface::load();
    command_line_interface.run()
}
