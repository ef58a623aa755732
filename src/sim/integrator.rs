use nalgebra::{Vector3, Vector6};

// ---------------------------------------------------------------------------
// RK4 integrator over packed translational state
// ---------------------------------------------------------------------------

/// Pack position and velocity into one state vector.
pub fn pack(position: Vector3<f64>, velocity: Vector3<f64>) -> Vector6<f64> {
    Vector6::new(
        position.x, position.y, position.z, velocity.x, velocity.y, velocity.z,
    )
}

/// Split a state vector back into (position, velocity).
pub fn unpack(state: &Vector6<f64>) -> (Vector3<f64>, Vector3<f64>) {
    (
        Vector3::new(state[0], state[1], state[2]),
        Vector3::new(state[3], state[4], state[5]),
    )
}

/// Single classical RK4 step of `y' = f(t, y)`.
pub fn rk4<F>(f: F, t: f64, y: &Vector6<f64>, h: f64) -> Vector6<f64>
where
    F: Fn(f64, &Vector6<f64>) -> Vector6<f64>,
{
    let k1 = f(t, y);
    let k2 = f(t + h * 0.5, &(y + k1 * (h * 0.5)));
    let k3 = f(t + h * 0.5, &(y + k2 * (h * 0.5)));
    let k4 = f(t + h, &(y + k3 * h));

    y + (k1 + (k2 + k3) * 2.0 + k4) * (h / 6.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_roundtrip() {
        let position = Vector3::new(1.0, 2.0, 3.0);
        let velocity = Vector3::new(-4.0, 5.0, -6.0);
        let (p, v) = unpack(&pack(position, velocity));
        assert_eq!(p, position);
        assert_eq!(v, velocity);
    }

    #[test]
    fn rk4_is_exact_on_constant_acceleration() {
        // y'' = -g: a cubic-free problem RK4 solves to machine precision
        let g = 9.81;
        let f = |_t: f64, y: &Vector6<f64>| {
            let (_, velocity) = unpack(y);
            pack(velocity, Vector3::new(0.0, 0.0, -g))
        };
        let y0 = pack(Vector3::zeros(), Vector3::new(10.0, 0.0, 20.0));
        let mut y = y0;
        let h = 0.5;
        for step in 0..8 {
            y = rk4(f, step as f64 * h, &y, h);
        }
        let t = 4.0;
        let (position, velocity) = unpack(&y);
        assert!((position.x - 10.0 * t).abs() < 1e-9);
        assert!((position.z - (20.0 * t - 0.5 * g * t * t)).abs() < 1e-9);
        assert!((velocity.z - (20.0 - g * t)).abs() < 1e-9);
    }

    #[test]
    fn rk4_order_four_on_harmonic_oscillator() {
        // x'' = -x, exact solution cos(t); halving h must shrink the error
        // by roughly 2^5 (local truncation is O(h^5))
        let f = |_t: f64, y: &Vector6<f64>| {
            let (position, velocity) = unpack(y);
            pack(velocity, -position)
        };
        let error_at = |h: f64| {
            let mut y = pack(Vector3::new(1.0, 0.0, 0.0), Vector3::zeros());
            y = rk4(f, 0.0, &y, h);
            let (position, _) = unpack(&y);
            (position.x - h.cos()).abs()
        };
        let coarse = error_at(0.2);
        let fine = error_at(0.1);
        assert!(fine < coarse / 20.0, "coarse {} fine {}", coarse, fine);
    }
}
