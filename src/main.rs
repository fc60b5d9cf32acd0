fn main() {
    cliffside::run();
}
