use colored::Colorize;

pub fn show() {
    let version = env!("CARGO_PKG_VERSION");
    let name = env!("CARGO_PKG_NAME");

    println!("{} v{}", name.bright_green(), version.bright_white());
    println!(
        "Installs Apache Spark {}",
        crate::config::DEFAULT_SPARK_VERSION.bright_blue()
    );
}
