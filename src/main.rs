fn main() -> anyhow::Result<()> {
    whatidid_lib::run()
}
