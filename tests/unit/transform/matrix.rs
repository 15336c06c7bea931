use super::*;

fn sample() -> Matrix {
    Matrix::translate(10.0, -5.0, 3.0)
        .multiply(&Matrix::rotate(0.3, 0.2, 0.1))
        .multiply(&Matrix::scale(2.0, 3.0, 4.0))
}

#[test]
fn identity_is_neutral_for_multiply() {
    let m = sample();
    assert_eq!(Matrix::IDENTITY.multiply(&m), m);
    assert_eq!(m.multiply(&Matrix::IDENTITY), m);
}

#[test]
fn equality_ignores_projective_entries() {
    let mut a = Matrix::translate(1.0, 2.0, 3.0);
    let b = a;
    a.0[3] = 7.0;
    a.0[15] = 0.5;
    assert_eq!(a, b);
    a.0[13] = 2.5;
    assert_ne!(a, b);
}

#[test]
fn inverse_undoes_transform() {
    let m = sample();
    let product = m.inverse().multiply4x4(&m);
    assert!(product.approx_eq(&Matrix::IDENTITY, 1e-6), "{product:?}");
    assert!((product.0[15] - 1.0).abs() < 1e-6);
}

#[test]
fn inverse_of_singular_is_not_finite() {
    let m = Matrix::scale(0.0, 1.0, 1.0);
    assert!(!m.inverse().is_finite());
}

#[test]
fn multiply_keeps_parent_translation() {
    let parent = Matrix::translate(100.0, 0.0, 0.0);
    let child = Matrix::translate(0.0, 50.0, 0.0);
    assert_eq!(
        parent.multiply(&child),
        Matrix::translate(100.0, 50.0, 0.0)
    );

    let rotated = Matrix::rotate_z(std::f64::consts::FRAC_PI_2).multiply(&child);
    assert!(rotated.approx_eq(&Matrix::translate(-50.0, 0.0, 0.0).multiply(&Matrix::rotate_z(std::f64::consts::FRAC_PI_2)), 1e-9));
}

#[test]
fn composition_is_not_commutative() {
    let a = Matrix::translate(10.0, 0.0, 0.0);
    let b = Matrix::scale(2.0, 2.0, 2.0);
    assert_ne!(a.multiply(&b), b.multiply(&a));
    assert_eq!(b.multiply(&a).get_translate(), [20.0, 0.0, 0.0]);
}

#[test]
fn move_then_uses_local_frame() {
    let m = Matrix::scale(2.0, 2.0, 1.0).then_move([5.0, 5.0, 0.0]);
    let moved = Matrix::move_then([-10.0, -10.0, 0.0], &m);
    assert_eq!(moved.get_translate(), [-15.0, -15.0, 0.0]);
    assert_eq!(m.then_move([1.0, 2.0, 3.0]).get_translate(), [6.0, 7.0, 3.0]);
}

#[test]
fn about_origin_fixes_the_pivot() {
    let spin = Matrix::rotate_z(std::f64::consts::PI);
    let pivoted = Matrix::about_origin([50.0, 50.0, 0.0], &spin);
    let p = pivoted.to_affine() * kurbo::Point::new(50.0, 50.0);
    assert!((p.x - 50.0).abs() < 1e-9 && (p.y - 50.0).abs() < 1e-9);
}

#[test]
fn rotate_axis_matches_rotate_z() {
    let theta = 0.7;
    assert!(Matrix::rotate_axis([0.0, 0.0, 1.0], theta).approx_eq(&Matrix::rotate_z(theta), 1e-12));
}

#[test]
fn transpose_twice_is_identity_op() {
    let m = sample();
    assert_eq!(m.transpose().transpose(), m);
    assert_eq!(m.transpose().0[3], m.0[12]);
}

#[test]
fn affine_projection_round_trips_2d() {
    let m = Matrix::translate(3.0, 4.0, 0.0).multiply(&Matrix::rotate_z(0.4));
    let p = m.to_affine() * kurbo::Point::new(1.0, 0.0);
    assert!((p.x - (3.0 + 0.4f64.cos())).abs() < 1e-12);
    assert!((p.y - (4.0 + 0.4f64.sin())).abs() < 1e-12);
    assert_eq!(Matrix::from_affine(m.to_affine()), m);
}

#[test]
fn perspective_sets_projective_term() {
    let p = Matrix::perspective(1000.0);
    assert_eq!(p.0[11], -1e-3);
    assert_eq!(p, Matrix::IDENTITY);
}
