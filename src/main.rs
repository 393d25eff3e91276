fn main() {
    decaf_harness::cli::run();
}
