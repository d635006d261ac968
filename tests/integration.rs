use image::{DynamicImage, ImageFormat};
use imgbatch::{
    app::{App, AppServices},
    archive::build_archive,
    download::MockDownload,
    intake::{load_uploads, UploadedItem},
    models::{
        BatchReport, Config, DuplicatePolicy, Quality, TargetFormat, TransformParameters,
        Workflow,
    },
    preview::MockPreview,
    transform::{ImageTransformer, MockTransformer},
    Error,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::io::{Cursor, Read};
use zip::ZipArchive;

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

fn png_upload(name: &str, width: u32, height: u32) -> UploadedItem {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([20, 40, 60, 200]));
    UploadedItem::new(name, encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)).unwrap()
}

fn jpeg_upload(name: &str, width: u32, height: u32) -> UploadedItem {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 100, 50]));
    UploadedItem::new(name, encode(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)).unwrap()
}

fn read_archive(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            (file.name().to_string(), content)
        })
        .collect()
}

fn build_app(preview: &MockPreview, download: &MockDownload) -> App {
    App::with_services(
        AppServices {
            transformer: Box::new(ImageTransformer::new()),
            preview: Box::new(preview.clone()),
            download: Box::new(download.clone()),
        },
        DuplicatePolicy::Rename,
    )
}

#[tokio::test]
async fn test_convert_png_and_jpeg_to_png_archive() {
    let preview = MockPreview::new();
    let download = MockDownload::new();
    let app = build_app(&preview, &download);

    let items = vec![png_upload("x.png", 8, 5), jpeg_upload("y.jpg", 6, 9)];
    let params = TransformParameters::FormatConversion {
        target: TargetFormat::Png,
    };

    let report = app.run(&items, &params).await.unwrap().unwrap();
    assert_eq!(report.workflow, Workflow::FormatConversion);

    let (archive, content_type) = download.get_file("imagenes_convertidas.zip").unwrap();
    assert_eq!(content_type, "application/zip");

    let entries = read_archive(&archive);
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["x.png", "y.png"]);

    for ((_, bytes), expected) in entries.iter().zip([(8, 5), (6, 9)]) {
        assert_eq!(image::guess_format(bytes).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), expected);
    }

    assert_eq!(
        preview.get_captions(),
        vec![
            (
                "Original image: x.png".to_string(),
                "Converted to PNG: x.png".to_string()
            ),
            (
                "Original image: y.jpg".to_string(),
                "Converted to PNG: y.png".to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn test_quality_reduction_keeps_names_with_jpeg_content() {
    let preview = MockPreview::new();
    let download = MockDownload::new();
    let app = build_app(&preview, &download);

    let items = vec![png_upload("a.png", 10, 10), jpeg_upload("b.jpeg", 4, 3)];
    let params = TransformParameters::QualityReduction {
        level: Quality::new(15).unwrap(),
    };

    let report = app.run(&items, &params).await.unwrap().unwrap();
    assert_eq!(report.archive_file_name, "imagenes_reducidas.zip");

    let (archive, _) = download.get_file("imagenes_reducidas.zip").unwrap();
    let entries = read_archive(&archive);
    assert_eq!(entries.len(), items.len());
    assert_eq!(entries[0].0, "a.png");
    assert_eq!(entries[1].0, "b.jpeg");

    for (_, bytes) in &entries {
        assert_eq!(image::guess_format(bytes).unwrap(), ImageFormat::Jpeg);
    }
    let decoded = image::load_from_memory(&entries[0].1).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (10, 10));
}

#[tokio::test]
async fn test_entry_count_matches_upload_count() {
    for count in [1usize, 2, 5] {
        let download = MockDownload::new();
        let app = build_app(&MockPreview::new(), &download);
        let items: Vec<UploadedItem> = (0..count)
            .map(|i| jpeg_upload(&format!("img{}.jpg", i), 2, 2))
            .collect();

        let report = app
            .run(
                &items,
                &TransformParameters::FormatConversion {
                    target: TargetFormat::Jpeg,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.entries.len(), count);
        let (archive, _) = download.get_file("imagenes_convertidas.zip").unwrap();
        assert_eq!(read_archive(&archive).len(), count);
    }
}

#[tokio::test]
async fn test_empty_upload_offers_nothing() {
    let preview = MockPreview::new();
    let download = MockDownload::new();
    let app = build_app(&preview, &download);

    let report = app
        .run(
            &[],
            &TransformParameters::QualityReduction {
                level: Quality::DEFAULT,
            },
        )
        .await
        .unwrap();

    assert!(report.is_none());
    assert_eq!(preview.get_show_count(), 0);
    assert_eq!(download.get_offer_count(), 0);
}

#[tokio::test]
async fn test_corrupt_upload_aborts_batch() {
    let preview = MockPreview::new();
    let download = MockDownload::new();
    let app = build_app(&preview, &download);

    let items = vec![
        png_upload("ok.png", 2, 2),
        UploadedItem::new("broken.png", b"not really a png".to_vec()).unwrap(),
    ];
    let result = app
        .run(
            &items,
            &TransformParameters::FormatConversion {
                target: TargetFormat::Png,
            },
        )
        .await;

    assert!(matches!(result, Err(Error::Image(_))));
    assert_eq!(preview.get_show_count(), 1);
    assert_eq!(download.get_offer_count(), 0);
}

#[tokio::test]
async fn test_app_new_writes_archive_and_preview_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("input");
    fs::create_dir_all(&input_dir).unwrap();

    let photo = input_dir.join("photo.JPG");
    fs::write(&photo, jpeg_upload("photo.JPG", 7, 7).bytes()).unwrap();
    let icon = input_dir.join("icon.png");
    fs::write(&icon, png_upload("icon.png", 3, 3).bytes()).unwrap();

    let config = Config {
        output_dir: dir.path().join("out"),
        default_quality: Quality::DEFAULT,
        duplicate_policy: DuplicatePolicy::Rename,
    };
    let preview_path = dir.path().join("preview.html");
    let app = App::new(&config, Some(&preview_path));

    let items = load_uploads(&[&photo, &icon]).unwrap();
    let report = app
        .run(
            &items,
            &TransformParameters::FormatConversion {
                target: TargetFormat::Png,
            },
        )
        .await
        .unwrap()
        .unwrap();

    let archive_path = config.output_dir.join("imagenes_convertidas.zip");
    assert_eq!(report.location, archive_path.display().to_string());

    let archive = fs::read(&archive_path).unwrap();
    let names: Vec<String> = read_archive(&archive)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["photo.png", "icon.png"]);

    let page = fs::read_to_string(&preview_path).unwrap();
    assert!(page.contains("Original image: photo.JPG"));
    assert!(page.contains("Converted to PNG: photo.png"));
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let app = App::with_services(
        AppServices {
            transformer: Box::new(MockTransformer::new().with_dimensions(2, 2)),
            preview: Box::new(MockPreview::new()),
            download: Box::new(MockDownload::new()),
        },
        DuplicatePolicy::Rename,
    );
    let items = vec![UploadedItem::new("a.png", vec![1, 2, 3]).unwrap()];

    let report = app
        .run(
            &items,
            &TransformParameters::QualityReduction {
                level: Quality::new(55).unwrap(),
            },
        )
        .await
        .unwrap()
        .unwrap();

    let json = serde_json::to_string_pretty(&report).unwrap();
    assert!(json.contains("\"workflow\": \"quality_reduction\""));
    assert!(json.contains("\"level\": 55"));

    let parsed: BatchReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.archive_entries, vec!["a.png"]);
    assert_eq!(parsed.entries[0].source_bytes, 3);
}

#[test]
fn test_build_archive_is_readable_zip() {
    let bytes = build_archive(&[
        ("one.png".to_string(), vec![1, 2, 3]),
        ("two.png".to_string(), vec![4, 5]),
    ])
    .unwrap();

    assert_eq!(
        read_archive(&bytes),
        vec![
            ("one.png".to_string(), vec![1, 2, 3]),
            ("two.png".to_string(), vec![4, 5]),
        ]
    );
}

#[test]
fn test_unsupported_upload_is_rejected() {
    let result = UploadedItem::new("clip.gif", vec![0x47, 0x49, 0x46]);
    assert!(matches!(result, Err(Error::UnsupportedExtension(_))));
}
