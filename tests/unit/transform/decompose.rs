use super::*;

fn assert_vec3_close(a: [f64; 3], b: [f64; 3]) {
    for i in 0..3 {
        assert!((a[i] - b[i]).abs() < 1e-6, "{a:?} != {b:?}");
    }
}

#[test]
fn build_of_interpret_reproduces_matrix() {
    let cases = [
        Decomposition {
            translate: [1.0, 2.0, 3.0],
            rotate: [0.3, -0.2, 0.5],
            skew: [0.0; 3],
            scale: [2.0, 2.0, 2.0],
        },
        Decomposition {
            translate: [-40.0, 12.5, 0.0],
            rotate: [0.0, 0.4, 0.7],
            skew: [0.0; 3],
            scale: [1.0, 2.0, 3.0],
        },
        Decomposition {
            translate: [0.0; 3],
            rotate: [0.0, 0.0, -1.2],
            skew: [0.1, 0.0, 0.0],
            scale: [1.5, 1.5, 1.5],
        },
    ];

    for spec in cases {
        let m = Matrix::build(&spec);
        let rebuilt = Matrix::build(&m.interpret());
        assert!(rebuilt.approx_eq(&m, 1e-6), "{m:?} vs {rebuilt:?}");
    }
}

#[test]
fn interpret_recovers_components() {
    let spec = Decomposition {
        translate: [5.0, 6.0, 7.0],
        rotate: [0.0, 0.0, 0.25],
        skew: [0.0; 3],
        scale: [2.0, 3.0, 1.0],
    };
    let out = Matrix::build(&spec).interpret();
    assert_vec3_close(out.translate, spec.translate);
    assert_vec3_close(out.rotate, spec.rotate);
    assert_vec3_close(out.scale, spec.scale);
    assert_vec3_close(out.skew, [0.0; 3]);
}

#[test]
fn interpret_identity_is_neutral() {
    let out = Matrix::IDENTITY.interpret();
    assert_vec3_close(out.translate, [0.0; 3]);
    assert_vec3_close(out.rotate, [0.0; 3]);
    assert_vec3_close(out.scale, [1.0; 3]);
    assert_vec3_close(out.skew, [0.0; 3]);
}

#[test]
fn collapsed_x_column_returns_degenerate_result() {
    let m = Matrix::scale(0.0, 1.0, 1.0).then_move([4.0, 0.0, 0.0]);
    let out = m.interpret();
    assert_eq!(out.translate, [4.0, 0.0, 0.0]);
    assert_eq!(out.scale, [0.0; 3]);
    assert_eq!(out.rotate, [0.0; 3]);
}

#[test]
fn average_blends_components() {
    let a = Matrix::IDENTITY;
    let b = Matrix::translate(10.0, 0.0, 0.0).multiply(&Matrix::scale(3.0, 3.0, 3.0));
    let mid = Matrix::average(&a, &b, 0.5);
    let expected = Matrix::translate(5.0, 0.0, 0.0).multiply(&Matrix::scale(2.0, 2.0, 2.0));
    assert!(mid.approx_eq(&expected, 1e-9), "{mid:?}");
    assert!(Matrix::average(&a, &b, 1.0).approx_eq(&b, 1e-9));
}

#[test]
fn normalize_rotation_flips_gimbal_case() {
    let out = normalize_rotation([PI * 0.5, 0.1, 0.2]);
    assert_vec3_close(out, [-PI * 0.5, PI - 0.1, 0.2 - PI]);
}

#[test]
fn normalize_rotation_folds_large_x() {
    let out = normalize_rotation([PI * 0.75, 0.0, 0.0]);
    assert_vec3_close(out, [-PI * 0.25, -PI, -PI]);
}

#[test]
fn normalize_rotation_wraps_y_and_z() {
    let out = normalize_rotation([0.0, 2.5 * PI, -2.5 * PI]);
    assert_vec3_close(out, [0.0, 0.5 * PI, -0.5 * PI]);
}
