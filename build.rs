/* Ensures the sample driven tests (see tests/samples.rs) are regenerated
 * whenever a sample program is added, removed, or edited. */

fn main() {
    build_deps::rerun_if_changed_paths("samples/*.vm").expect("samples glob is valid");
    build_deps::rerun_if_changed_paths("samples").expect("samples directory exists");
}
