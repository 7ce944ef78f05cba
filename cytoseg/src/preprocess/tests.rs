use common::Buffer2;

use super::*;

#[test]
fn test_kernel_normalized_and_symmetric() {
    let kernel = gaussian_kernel_1d(2.0);
    assert_eq!(kernel.len(), 13);
    let sum: f32 = kernel.iter().sum();
    assert!((sum - 1.0).abs() < 1e-5);
    for i in 0..kernel.len() / 2 {
        assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-7);
    }
    assert!(kernel[6] > kernel[5]);
}

#[test]
#[should_panic(expected = "Sigma must be positive")]
fn test_kernel_rejects_zero_sigma() {
    gaussian_kernel_1d(0.0);
}

#[test]
fn test_blur_preserves_constant_image() {
    let input = Buffer2::new_filled(17, 11, 42.0f32);
    let blurred = gaussian_blur(&input, 1.5);
    assert!(blurred.iter().all(|&v| (v - 42.0).abs() < 1e-3));
}

#[test]
fn test_blur_zero_sigma_is_identity() {
    let input = Buffer2::from_fn(5, 5, |x, y| (x * y) as f32);
    assert_eq!(gaussian_blur(&input, 0.0), input);
}

#[test]
fn test_blur_spreads_impulse_and_keeps_mass() {
    let mut input = Buffer2::new_filled(21, 21, 0.0f32);
    input[(10, 10)] = 100.0;
    let blurred = gaussian_blur(&input, 1.0);

    let total: f32 = blurred.iter().sum();
    assert!((total - 100.0).abs() < 1e-2);
    assert!(blurred[(10, 10)] < 100.0);
    assert!(blurred[(11, 10)] > 0.0);
    assert!((blurred[(11, 10)] - blurred[(10, 11)]).abs() < 1e-5);
    assert!(blurred[(10, 10)] > blurred[(11, 11)]);
}

#[test]
fn test_blur_larger_than_frame() {
    // Kernel radius 9 on a 3x3 frame still averages sensibly
    let input = Buffer2::from_fn(3, 3, |x, _| x as f32);
    let blurred = gaussian_blur(&input, 3.0);
    assert!(blurred.iter().all(|&v| (0.0..=2.0).contains(&v)));
    assert!(blurred[(0, 1)] < blurred[(2, 1)]);
}

#[test]
fn test_sobel_zero_on_flat_image() {
    let input = Buffer2::new_filled(6, 6, 9.0f32);
    assert!(sobel_magnitude(&input).iter().all(|&v| v == 0.0));
}

#[test]
fn test_sobel_responds_to_vertical_step() {
    let input = Buffer2::from_fn(8, 8, |x, _| if x < 4 { 0.0 } else { 10.0 });
    let edges = sobel_magnitude(&input);
    // 1 + 2 + 1 rows of a 10-unit step
    assert_eq!(edges[(3, 4)], 40.0);
    assert_eq!(edges[(4, 4)], 40.0);
    assert_eq!(edges[(1, 4)], 0.0);
    assert_eq!(edges[(6, 4)], 0.0);
}

#[test]
fn test_texture_is_flat_for_uniform_frame() {
    let input = Buffer2::new_filled(10, 10, 200.0f32);
    assert!(texture(&input, 1.0).iter().all(|&v| v.abs() < 1e-6));
}
