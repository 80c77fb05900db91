#![allow(non_snake_case)]
use super::*;
use crate::{
    algebra::*,
    solver::{core::kktsolvers::KKTEngine, core::SolverJSONReadWrite, PIQP_INF},
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::Write;
use std::{fs::File, io, io::Read};

// The problem as given by the user, i.e. unscaled and with full length
// bound vectors.  Absent bounds are written as ∓PIQP_INF since JSON
// has no infinities.

#[derive(Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned, M: Serialize + DeserializeOwned")]
struct JsonProblemData<T: FloatT, M> {
    pub P: M,
    pub c: Vec<T>,
    pub A: M,
    pub b: Vec<T>,
    pub G: M,
    pub h: Vec<T>,
    pub x_lb: Vec<T>,
    pub x_ub: Vec<T>,
    pub settings: Settings<T>,
}

impl<T, M, K> SolverJSONReadWrite for Solver<T, M, K>
where
    T: FloatT + DeserializeOwned + Serialize,
    M: ProblemMatrix<T> + DeserializeOwned + Serialize,
    K: KKTEngine<T, M>,
{
    fn write_to_file(&self, file: &mut File) -> Result<(), io::Error> {
        // restore scaling to original
        let mut data = self.data.clone();
        data.unscale();
        let (mut x_lb, mut x_ub) = data.unscaled_bounds();
        sanitize_bounds(&mut x_lb, &mut x_ub);

        let json_data = JsonProblemData {
            P: data.P,
            c: data.c,
            A: data.A,
            b: data.b,
            G: data.G,
            h: data.h,
            x_lb,
            x_ub,
            settings: self.settings.clone(),
        };

        let json = serde_json::to_string(&json_data)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }

    fn read_from_file(file: &mut File) -> Result<Self, io::Error> {
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let json_data: JsonProblemData<T, M> = serde_json::from_str(&buffer)?;

        let d = json_data;
        Self::new(
            &d.P,
            &d.c,
            &d.A,
            &d.b,
            &d.G,
            &d.h,
            Some(&d.x_lb[..]),
            Some(&d.x_ub[..]),
            d.settings,
        )
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

fn sanitize_bounds<T: FloatT>(x_lb: &mut [T], x_ub: &mut [T]) {
    let inf: T = PIQP_INF.as_T();
    for v in x_lb.iter_mut().filter(|v| v.is_infinite()) {
        *v = -inf;
    }
    for v in x_ub.iter_mut().filter(|v| v.is_infinite()) {
        *v = inf;
    }
}

#[test]
fn test_json_io() {
    use crate::solver::IPSolver;
    use std::io::{Seek, SeekFrom};

    let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![4.0, 1.0, 2.0]);
    let c = [1.0, 1.0];
    let A = CscMatrix::new(1, 2, vec![0, 1, 2], vec![0, 0], vec![1.0, 1.0]);
    let b = [1.0];
    let G = CscMatrix::zeros(0, 2);
    let x_lb = [0.0, f64::NEG_INFINITY];
    let x_ub = [0.7, f64::INFINITY];

    let settings = SettingsBuilder::default().max_iter(50).build().unwrap();

    let mut solver =
        SparseSolver::<f64>::new(&P, &c, &A, &b, &G, &[], Some(&x_lb[..]), Some(&x_ub[..]), settings)
            .unwrap();
    solver.solve();

    // write the problem to a file
    let mut file = tempfile::tempfile().unwrap();
    solver.write_to_file(&mut file).unwrap();

    // read the problem from the file
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut solver2 = SparseSolver::<f64>::read_from_file(&mut file).unwrap();
    assert_eq!(solver2.data.n_lb, 1);
    assert_eq!(solver2.data.n_ub, 1);
    assert_eq!(solver2.settings().max_iter, 50);

    solver2.solve();
    assert_eq!(solver.result().info.status, solver2.result().info.status);
    for (x1, x2) in solver.result().x.iter().zip(&solver2.result().x) {
        assert!((x1 - x2).abs() < 1e-7);
    }
}
