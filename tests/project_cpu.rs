use equicube::{
    Channels, CpuProjector, EquicubeError, Face, ProjectorKind, SourceImage, create_projector,
    project_cubemap, testcard,
};

/// 64x32 black panorama with a red marker at lon 0 / lat 0 and a blue
/// marker at lon pi/2 / lat 0.
fn marker_source() -> SourceImage {
    let (w, h) = (64u32, 32u32);
    let mut data = vec![0u8; (w * h * 3) as usize];
    let put = |data: &mut [u8], x: u32, y: u32, px: [u8; 3]| {
        let start = ((y * w + x) * 3) as usize;
        data[start..start + 3].copy_from_slice(&px);
    };
    put(&mut data, 32, 16, [255, 0, 0]); // lon 0   -> +z
    put(&mut data, 48, 16, [0, 0, 255]); // lon pi/2 -> +x
    SourceImage::from_raw(w, h, Channels::Rgb, data).unwrap()
}

fn init_logs() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn repeated_runs_are_byte_identical() {
    init_logs();
    let source = testcard(64, 32).unwrap();
    let mut cpu = CpuProjector::new();
    let a = project_cubemap(&mut cpu, &source, 17).unwrap();
    let b = project_cubemap(&mut cpu, &source, 17).unwrap();
    for (face, img) in a.iter() {
        assert_eq!(img.data, b.get(face).data, "face {face} not deterministic");
    }
}

#[test]
fn face_centers_sample_their_cardinal_longitude() {
    let source = marker_source();
    let mut cpu = CpuProjector::new();
    // Odd face size puts a pixel center exactly at u = v = 0.
    let cube = project_cubemap(&mut cpu, &source, 63).unwrap();

    assert_eq!(cube.get(Face::Pz).pixel(31, 31), &[255, 0, 0]);
    assert_eq!(cube.get(Face::Px).pixel(31, 31), &[0, 0, 255]);
    // Faces not looking at a marker stay black at their centers.
    assert_eq!(cube.get(Face::Py).pixel(31, 31), &[0, 0, 0]);
}

#[test]
fn rgba_alpha_survives_projection_untouched() {
    let (w, h) = (32u32, 16u32);
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for i in 0..(w * h) {
        data.extend_from_slice(&[(i % 256) as u8, 0, 255, 128]);
    }
    let source = SourceImage::from_raw(w, h, Channels::Rgba, data).unwrap();

    let mut cpu = CpuProjector::new();
    let cube = project_cubemap(&mut cpu, &source, 8).unwrap();
    for (face, img) in cube.iter() {
        assert_eq!(img.channels, Channels::Rgba);
        assert!(
            img.data.chunks_exact(4).all(|px| px[3] == 128),
            "face {face} lost alpha"
        );
    }
}

#[test]
fn single_pixel_faces_are_valid() {
    let source = testcard(8, 4).unwrap();
    let mut cpu = CpuProjector::new();
    let cube = project_cubemap(&mut cpu, &source, 1).unwrap();
    for (_, img) in cube.iter() {
        assert_eq!(img.size, 1);
        assert_eq!(img.data.len(), 3);
    }
}

#[test]
fn grayscale_source_is_rejected_before_projection() {
    let gray = image::DynamicImage::ImageLuma8(image::GrayImage::new(16, 8));
    let err = SourceImage::from_decoded(gray).unwrap_err();
    assert!(matches!(err, EquicubeError::InvalidInput(_)));
}

#[test]
fn zero_face_size_is_rejected() {
    let source = testcard(8, 4).unwrap();
    let mut cpu = create_projector(ProjectorKind::Cpu).unwrap();
    let err = project_cubemap(cpu.as_mut(), &source, 0).unwrap_err();
    assert!(matches!(err, EquicubeError::InvalidConfig(_)));
}

#[test]
fn equatorial_faces_cover_the_full_longitude_ramp() {
    // On the testcard red is the longitude ramp; each equatorial face spans
    // a quarter turn, so the four centers must be strictly increasing in
    // red going pz -> px -> nz -> nx (lon 0, pi/2, pi, -pi/2 wraps around).
    let source = testcard(256, 128).unwrap();
    let mut cpu = CpuProjector::new();
    let cube = project_cubemap(&mut cpu, &source, 33).unwrap();

    let center_red = |face: Face| cube.get(face).pixel(16, 16)[0];
    let pz = center_red(Face::Pz);
    let px = center_red(Face::Px);
    let nx = center_red(Face::Nx);
    assert!(pz > nx, "pz (lon 0) should be redder than nx (lon -pi/2)");
    assert!(px > pz, "px (lon pi/2) should be redder than pz (lon 0)");
}
