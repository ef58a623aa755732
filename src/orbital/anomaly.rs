use std::f64::consts::{PI, TAU};

// Below this mean anomaly, Kepler's equation is linearized instead of
// iterated: sin E ~ E turns M = E - e sin E into M = (1 - e) E.
const LINEAR_THRESHOLD: f64 = 1.490_116_119_384_765_6e-8; // 2^-26

/// True anomaly from eccentric anomaly.
pub fn true_anomaly_at_eccentric_anomaly(eccentricity: f64, eccentric_anomaly: f64) -> f64 {
    let e = eccentricity;
    let ea = eccentric_anomaly;
    if e < 1.0 {
        let x = (1.0 - e).sqrt() * (ea / 2.0).cos();
        let y = (1.0 + e).sqrt() * (ea / 2.0).sin();
        2.0 * y.atan2(x)
    } else if e == 1.0 {
        2.0 * ea.atan()
    } else {
        let x = (e - 1.0).sqrt() * (ea / 2.0).cosh();
        let y = (e + 1.0).sqrt() * (ea / 2.0).sinh();
        2.0 * y.atan2(x)
    }
}

/// Eccentric anomaly from true anomaly.
pub fn eccentric_anomaly_at_true_anomaly(eccentricity: f64, true_anomaly: f64) -> f64 {
    let e = eccentricity;
    let v = true_anomaly;
    if e < 1.0 {
        let x = (1.0 + e).sqrt() * (v / 2.0).cos();
        let y = (1.0 - e).sqrt() * (v / 2.0).sin();
        2.0 * y.atan2(x)
    } else if e == 1.0 {
        (v / 2.0).tan()
    } else {
        2.0 * (((e - 1.0) / (e + 1.0)).sqrt() * (v / 2.0).tan()).atanh()
    }
}

/// Mean anomaly from eccentric anomaly (Kepler's equation, and its
/// parabolic and hyperbolic counterparts).
pub fn mean_anomaly_at_eccentric_anomaly(eccentricity: f64, eccentric_anomaly: f64) -> f64 {
    let e = eccentricity;
    let ea = eccentric_anomaly;
    if e < 1.0 {
        ea - e * ea.sin()
    } else if e == 1.0 {
        // Barker's equation
        (ea.powi(3) + ea * 3.0) / 2.0
    } else {
        e * ea.sinh() - ea
    }
}

/// Eccentric anomaly from mean anomaly, inverting Kepler's equation.
pub fn eccentric_anomaly_at_mean_anomaly(eccentricity: f64, mean_anomaly: f64) -> f64 {
    let e = eccentricity;
    if e < 1.0 {
        let m = mean_anomaly.rem_euclid(TAU);
        if m.abs() < LINEAR_THRESHOLD {
            return m / (1.0 - e);
        }
        newton_raphson(PI, |ea| ea - e * ea.sin() - m, |ea| 1.0 - e * ea.cos())
    } else if e == 1.0 {
        // Barker's equation has the closed-form (Cardano) solution
        // E = z - 1/z with z^3 = M + sqrt(M^2 + 1)
        let m = mean_anomaly;
        let z = (m + (m * m + 1.0).sqrt()).cbrt();
        z - 1.0 / z
    } else {
        let m = mean_anomaly;
        if m.abs() < LINEAR_THRESHOLD {
            return m / (e - 1.0);
        }
        newton_raphson(1.0, |ea| e * ea.sinh() - ea - m, |ea| e * ea.cosh() - 1.0)
    }
}

/// Mean anomaly from true anomaly.
pub fn mean_anomaly_at_true_anomaly(eccentricity: f64, true_anomaly: f64) -> f64 {
    let ea = eccentric_anomaly_at_true_anomaly(eccentricity, true_anomaly);
    mean_anomaly_at_eccentric_anomaly(eccentricity, ea)
}

/// True anomaly from mean anomaly.
pub fn true_anomaly_at_mean_anomaly(eccentricity: f64, mean_anomaly: f64) -> f64 {
    let ea = eccentric_anomaly_at_mean_anomaly(eccentricity, mean_anomaly);
    true_anomaly_at_eccentric_anomaly(eccentricity, ea)
}

// Look around `x0` for a root of `f` with derivative `f_prime`. Stops when
// the iteration repeats a value (best float accuracy reached) or after a
// fixed number of iterations.
fn newton_raphson<F, D>(x0: f64, f: F, f_prime: D) -> f64
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    let mut x = x0;
    let mut previous = 0.0;
    for _ in 0..30 {
        let before_that = previous;
        previous = x;
        x -= f(x) / f_prime(x);
        if x == previous || x == before_that {
            break;
        }
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elliptic_kepler_roundtrip() {
        for &e in &[0.0, 0.1, 0.5, 0.9, 0.999] {
            for &m in &[0.1, 1.0, 2.5, 3.14, 5.0] {
                let ea = eccentric_anomaly_at_mean_anomaly(e, m);
                let back = mean_anomaly_at_eccentric_anomaly(e, ea);
                assert!(
                    (back - m).abs() < 1e-9,
                    "e={} M={}: recovered {}",
                    e,
                    m,
                    back
                );
            }
        }
    }

    #[test]
    fn hyperbolic_kepler_roundtrip() {
        for &e in &[1.1, 1.5, 2.0, 10.0] {
            for &m in &[-3.0, -0.5, 0.5, 3.0] {
                let ea = eccentric_anomaly_at_mean_anomaly(e, m);
                let back = mean_anomaly_at_eccentric_anomaly(e, ea);
                assert!(
                    (back - m).abs() < 1e-9,
                    "e={} M={}: recovered {}",
                    e,
                    m,
                    back
                );
            }
        }
    }

    #[test]
    fn parabolic_roundtrip() {
        for &m in &[-4.0, -0.3, 0.0, 0.3, 4.0] {
            let ea = eccentric_anomaly_at_mean_anomaly(1.0, m);
            let back = mean_anomaly_at_eccentric_anomaly(1.0, ea);
            assert!((back - m).abs() < 1e-9, "M={}: recovered {}", m, back);
        }
    }

    #[test]
    fn true_anomaly_roundtrip_all_regimes() {
        for &e in &[0.2, 0.8, 1.0, 1.3, 2.5] {
            for &v in &[-1.2, -0.4, 0.0, 0.7, 1.5] {
                let m = mean_anomaly_at_true_anomaly(e, v);
                let back = true_anomaly_at_mean_anomaly(e, m);
                // elliptic conversions may come back shifted by a full turn
                let wrapped = (back - v).rem_euclid(TAU);
                assert!(
                    wrapped < 1e-9 || wrapped > TAU - 1e-9,
                    "e={} v={}: recovered {}",
                    e,
                    v,
                    back
                );
            }
        }
    }

    #[test]
    fn small_mean_anomaly_is_linearized() {
        let e = 0.3;
        let m = 1e-9;
        let ea = eccentric_anomaly_at_mean_anomaly(e, m);
        assert!((ea - m / (1.0 - e)).abs() < 1e-18);

        let e = 1.7;
        let ea = eccentric_anomaly_at_mean_anomaly(e, m);
        assert!((ea - m / (e - 1.0)).abs() < 1e-18);
    }

    #[test]
    fn circular_anomalies_coincide() {
        for &m in &[0.3, 2.0, 4.5] {
            let v = true_anomaly_at_mean_anomaly(0.0, m);
            // on a circle mean, eccentric and true anomaly are the same angle
            assert!(
                ((v - m).rem_euclid(TAU)).min((m - v).rem_euclid(TAU)) < 1e-9,
                "M={} gave v={}",
                m,
                v
            );
        }
    }
}
