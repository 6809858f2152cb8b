use stoat::uci;

fn main() {
    uci::run();
}
