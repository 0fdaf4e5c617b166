use super::*;

#[test]
fn pad_width_never_drops_below_four() {
    assert_eq!(pad_width(0), 4);
    assert_eq!(pad_width(1), 4);
    assert_eq!(pad_width(300), 4);
    assert_eq!(pad_width(10_000), 4);
}

#[test]
fn pad_width_scales_past_ten_thousand_frames() {
    assert_eq!(pad_width(10_001), 5);
    assert_eq!(pad_width(100_000), 5);
    assert_eq!(pad_width(100_001), 6);
}

#[test]
fn stems_sort_numerically() {
    let width = pad_width(12_000);
    let mut stems: Vec<String> = [11_999u64, 2, 10_000, 999]
        .iter()
        .map(|&i| frame_stem(FrameIndex(i), width))
        .collect();
    stems.sort();
    assert_eq!(
        stems,
        vec!["frame00002", "frame00999", "frame10000", "frame11999"]
    );
}

#[test]
fn artifact_paths_share_stem() {
    let a = RenderArtifact::for_frame(Path::new("_movie"), FrameIndex(7), 4, "ppm", "png");
    assert_eq!(a.raw_path, Path::new("_movie").join("frame0007.ppm"));
    assert_eq!(a.image_path, Path::new("_movie").join("frame0007.png"));
}

#[test]
fn task_looks_at_origin_from_offset() {
    let origin = Vector3::new(278.0, 278.0, 400.0);
    let t = FrameTask::new(FrameIndex(0), origin, Vector3::new(200.0, 0.0, -1000.0));
    assert_eq!(t.lookat, origin);
    assert_eq!(t.lookfrom, Vector3::new(478.0, 278.0, -600.0));
}

#[cfg(unix)]
#[test]
fn assembly_command_matches_stem_pattern() {
    assert_eq!(
        assembly_command(Path::new("_movie"), 4, "png", 30),
        "ffmpeg -r 30 -f image2 -i _movie/frame%04d.png -vcodec libx264 -crf 25 _movie.mpg"
    );
    assert!(assembly_command(Path::new("out"), 6, "png", 24).contains("out/frame%06d.png"));
}

#[cfg(unix)]
#[test]
fn assembly_command_in_current_dir_names_a_file() {
    let cmd = assembly_command(Path::new("."), 4, "png", 30);
    assert!(cmd.ends_with(" ./out.mpg"), "{cmd}");
    assert!(assembly_command(Path::new("renders/.."), 4, "png", 30).ends_with(" renders/../out.mpg"));
}
