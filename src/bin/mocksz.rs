//! Command line runner for the `mocksz` library.

#[cfg(not(feature = "for-testing"))]
#[quit::main]
fn main() {
    mocksz::cli::run::run();
}

#[cfg(feature = "for-testing")]
fn main() {
    eprintln!(
        "Warning: The `for-testing` feature is enabled, which will clutter error messages\n\
         Tip: Build without --features=for-testing for regular use"
    );
    mocksz::cli::run::run();
}
