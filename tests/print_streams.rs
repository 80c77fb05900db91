#![allow(non_snake_case)]

use piqp::{algebra::*, solver::*, ConfigurablePrintTarget};

fn test_print_solver() -> SparseSolver<f64> {
    let P = CscMatrix::identity(1);
    let c = [0.];
    let A = CscMatrix::zeros(0, 1);
    let G = CscMatrix::identity(1);
    let h = [1.];
    let settings = SettingsBuilder::default()
        .verbose(true)
        .compute_timings(true)
        .build()
        .unwrap();
    SparseSolver::new(&P, &c, &A, &[], &G, &h, None, None, settings).unwrap()
}

#[test]
fn test_print_to_stdout() {
    let mut solver = test_print_solver();
    solver.print_to_stdout();
    solver.solve();
}

#[test]
fn test_print_to_buffer() {
    let mut solver = test_print_solver();
    solver.print_to_buffer();
    solver.solve();
    let result = solver.get_print_buffer().unwrap();
    assert!(result.contains("piqp v"));
    assert!(result.contains("PIQP_SOLVED"));
    assert!(result.contains("prim_obj"));
    assert!(result.contains("total run time"));
}

#[test]
fn test_print_quiet() {
    let mut solver = test_print_solver();
    solver.settings_mut().verbose = false;
    solver.print_to_buffer();
    solver.solve();
    assert!(solver.get_print_buffer().unwrap().is_empty());
}

#[test]
fn test_timings() {
    let mut solver = test_print_solver();
    solver.print_to_buffer();
    solver.solve();
    let info = solver.info();
    assert!(info.solve_time > 0.);
    assert!(info.run_time >= info.solve_time);
    assert_eq!(info.update_time, 0.);

    let mut solver = test_print_solver();
    solver.update_settings(Settings::default());
    solver.solve();
    assert_eq!(solver.info().solve_time, 0.);
}

#[test]
fn test_print_to_file() {
    use std::io::{Read, Seek};

    let mut solver = test_print_solver();
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut file2 = file.reopen().unwrap();
    solver.print_to_file(file.into_file());
    solver.solve();

    file2.seek(std::io::SeekFrom::Start(0)).unwrap();
    let mut result = String::new();
    file2.read_to_string(&mut result).unwrap();
    assert!(result.contains("piqp v"));
}

#[test]
fn test_print_to_stream() {
    use std::io::{Read, Seek};

    let mut solver = test_print_solver();
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut file2 = file.reopen().unwrap();
    let stream = Box::new(file.into_file());

    solver.print_to_stream(stream);
    solver.solve();

    file2.seek(std::io::SeekFrom::Start(0)).unwrap();
    let mut result = String::new();
    file2.read_to_string(&mut result).unwrap();
    assert!(result.contains("piqp v"));
}
