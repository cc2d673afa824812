use std::sync::Arc;

use bytes::Bytes;

use atelier_blob::{
    read_to_end, BlobStore, Category, ChunkReceiver, ChunkResult, ChunkSender, ChunkTransport,
    ChunkUpload, GalleryAdapter, GalleryConfig, GalleryError, GalleryResult, MediaType,
    MemoryBlobStore, UploadPlan, UploadStatus,
};

fn pattern_bytes(len: usize) -> Bytes {
    Bytes::from((0..len).map(|i| (i % 251) as u8).collect::<Vec<u8>>())
}

fn chunk_of(data: &Bytes, index: u32, chunk_size: usize) -> Bytes {
    let start = index as usize * chunk_size;
    let end = (start + chunk_size).min(data.len());
    data.slice(start..end)
}

fn upload_for(file_id: &str, index: u32, total: u32, data: Bytes) -> ChunkUpload {
    ChunkUpload::new(file_id, index, total, "Harvest Table.jpg", "furniture", data)
        .with_content_type("image/jpeg")
}

#[tokio::test]
async fn three_chunk_round_trip_reassembles_identically() {
    let store = Arc::new(MemoryBlobStore::new());
    let receiver = ChunkReceiver::with_store(store.clone(), GalleryConfig::default());

    let source = pattern_bytes(10 * 1024 * 1024);
    let chunk_size = 4 * 1024 * 1024;
    let total = 3u32;

    let mut media = None;
    for index in 0..total {
        let result = receiver
            .receive(upload_for("file-a", index, total, chunk_of(&source, index, chunk_size)))
            .await
            .unwrap();
        match result {
            ChunkResult::Partial {
                chunk_index,
                total_chunks,
            } => {
                assert!(index < total - 1, "chunk {index} should have completed");
                assert_eq!(chunk_index, index);
                assert_eq!(total_chunks, total);
            }
            ChunkResult::Complete { media: item } => {
                assert_eq!(index, total - 1, "completed early at chunk {index}");
                media = Some(item);
            }
        }
    }

    let media = media.expect("final chunk must complete the transfer");
    assert_eq!(media.size_bytes, 10 * 1024 * 1024);
    assert_eq!(media.category, Category::Furniture);
    assert_eq!(media.media_type, MediaType::Image);
    assert!(media.id.starts_with("furniture-harvest-table-"), "id: {}", media.id);
    assert!(media.id.ends_with(".jpg"));

    // Final object is byte-for-byte identical to the source
    let key = format!("gallery/{}", media.id);
    let fetched = store.get(&key).await.unwrap();
    let bytes = read_to_end(fetched.stream).await.unwrap();
    assert_eq!(bytes.len(), source.len());
    assert_eq!(bytes, source.as_ref());

    // Temp chunks are gone
    assert!(store.list("temp-chunks/file-a/").await.unwrap().is_empty());
}

#[tokio::test]
async fn single_chunk_transfer_completes_immediately() {
    let store = Arc::new(MemoryBlobStore::new());
    let receiver = ChunkReceiver::with_store(store.clone(), GalleryConfig::default());

    let source = pattern_bytes(1024);
    let result = receiver
        .receive(upload_for("file-solo", 0, 1, source.clone()))
        .await
        .unwrap();

    let media = match result {
        ChunkResult::Complete { media } => media,
        ChunkResult::Partial { .. } => panic!("single-chunk transfer stayed partial"),
    };
    assert_eq!(media.size_bytes, 1024);

    let key = format!("gallery/{}", media.id);
    let fetched = store.get(&key).await.unwrap();
    assert_eq!(read_to_end(fetched.stream).await.unwrap(), source.as_ref());
    assert!(store.list("temp-chunks/").await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_chunk_fails_assembly_and_cleans_up() {
    let store = Arc::new(MemoryBlobStore::new());
    let receiver = ChunkReceiver::with_store(store.clone(), GalleryConfig::default());

    let data = pattern_bytes(256);
    receiver
        .receive(upload_for("file-gap", 0, 3, data.clone()))
        .await
        .unwrap();
    // chunk 1 never arrives; chunk 2 is the final one
    let err = receiver
        .receive(upload_for("file-gap", 2, 3, data))
        .await
        .unwrap_err();

    match err {
        GalleryError::IncompleteAssembly { expected, found } => {
            assert_eq!(expected, 3);
            assert_eq!(found, 2);
        }
        other => panic!("expected IncompleteAssembly, got {other}"),
    }

    // No final object was produced, and the partial transfer was swept
    assert!(store.list("gallery/").await.unwrap().is_empty());
    assert!(store.list("temp-chunks/file-gap/").await.unwrap().is_empty());
}

#[tokio::test]
async fn reuploaded_chunk_overwrites_previous_bytes() {
    let store = Arc::new(MemoryBlobStore::new());
    let receiver = ChunkReceiver::with_store(store.clone(), GalleryConfig::default());

    let first = Bytes::from(vec![0xAA; 100]);
    let second = Bytes::from(vec![0xBB; 100]);
    let tail = Bytes::from(vec![0xCC; 50]);

    receiver
        .receive(upload_for("file-retry", 0, 2, first))
        .await
        .unwrap();
    // Client retried chunk 0 with different bytes; the retry wins
    receiver
        .receive(upload_for("file-retry", 0, 2, second))
        .await
        .unwrap();
    let result = receiver
        .receive(upload_for("file-retry", 1, 2, tail))
        .await
        .unwrap();

    let media = match result {
        ChunkResult::Complete { media } => media,
        ChunkResult::Partial { .. } => panic!("final chunk stayed partial"),
    };
    assert_eq!(media.size_bytes, 150);

    let key = format!("gallery/{}", media.id);
    let fetched = store.get(&key).await.unwrap();
    let bytes = read_to_end(fetched.stream).await.unwrap();
    let mut expected = vec![0xBB; 100];
    expected.extend_from_slice(&[0xCC; 50]);
    assert_eq!(bytes, expected);
}

#[tokio::test]
async fn validation_failures_leave_no_side_effects() {
    let store = Arc::new(MemoryBlobStore::new());
    let receiver = ChunkReceiver::with_store(store.clone(), GalleryConfig::default());
    let data = pattern_bytes(16);

    let bad_category =
        ChunkUpload::new("file-x", 0, 2, "pot.jpg", "pottery", data.clone());
    let err = receiver.receive(bad_category).await.unwrap_err();
    assert!(err.to_string().contains("Unknown category"));

    let missing_file_id = ChunkUpload::new("", 0, 2, "pot.jpg", "sketches", data.clone());
    assert!(receiver.receive(missing_file_id).await.is_err());

    let out_of_range = ChunkUpload::new("file-x", 5, 2, "pot.jpg", "sketches", data);
    assert!(receiver.receive(out_of_range).await.is_err());

    assert!(store.is_empty(), "validation errors must not write anything");
}

#[tokio::test]
async fn assembled_object_carries_advisory_metadata() {
    let store = Arc::new(MemoryBlobStore::new());
    let receiver = ChunkReceiver::with_store(store.clone(), GalleryConfig::default());

    let result = receiver
        .receive(
            ChunkUpload::new(
                "file-meta",
                0,
                1,
                "Comb Close-Up.jpg",
                "beekeeping",
                pattern_bytes(64),
            )
            .with_content_type("image/jpeg"),
        )
        .await
        .unwrap();

    let media = match result {
        ChunkResult::Complete { media } => media,
        ChunkResult::Partial { .. } => panic!("expected completion"),
    };
    let metadata = store
        .metadata_of(&format!("gallery/{}", media.id))
        .expect("final object should exist");
    assert_eq!(metadata.get("category").map(String::as_str), Some("beekeeping"));
    assert_eq!(
        metadata.get("original_name").map(String::as_str),
        Some("Comb Close-Up.jpg")
    );
    assert_eq!(metadata.get("media_type").map(String::as_str), Some("image"));
}

#[tokio::test]
async fn sender_reports_progress_and_success() {
    let store = Arc::new(MemoryBlobStore::new());
    let config = GalleryConfig::default().with_chunk_size(1024);
    let receiver = ChunkReceiver::with_store(store.clone(), config.clone());
    let sender = ChunkSender::new(receiver, config);

    let plan = UploadPlan::new(
        "Spring Garden.mov",
        Category::NativePlants,
        pattern_bytes(3000),
    )
    .with_name("Spring Garden Tour")
    .with_subtitle("May walkthrough")
    .with_content_type("video/quicktime");

    let media = sender.send_file(plan).await.unwrap();
    assert_eq!(media.media_type, MediaType::Video);
    assert_eq!(media.name, "Spring Garden Tour");
    assert_eq!(media.subtitle.as_deref(), Some("May walkthrough"));
    assert_eq!(media.category, Category::NativePlants);
    assert!(media.id.starts_with("native-plants-spring-garden-tour-"), "id: {}", media.id);
    assert!(media.id.ends_with(".mov"));
    assert_eq!(media.size_bytes, 3000);

    let progress = sender.progress_of("Spring Garden.mov").unwrap();
    assert_eq!(progress.status, UploadStatus::Success);
    assert_eq!(progress.progress, 100);
    assert_eq!(progress.chunks_uploaded, 3);
    assert_eq!(progress.total_chunks, 3);
}

struct FailingTransport {
    inner: ChunkReceiver,
    fail_at: u32,
}

#[async_trait::async_trait]
impl ChunkTransport for FailingTransport {
    async fn send(&self, upload: ChunkUpload) -> GalleryResult<ChunkResult> {
        if upload.chunk_index == self.fail_at {
            return Err(GalleryError::backend(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )));
        }
        self.inner.receive(upload).await
    }
}

#[tokio::test]
async fn sender_aborts_file_on_first_failed_chunk() {
    let store = Arc::new(MemoryBlobStore::new());
    let config = GalleryConfig::default().with_chunk_size(1024);
    let transport = FailingTransport {
        inner: ChunkReceiver::with_store(store.clone(), config.clone()),
        fail_at: 1,
    };
    let sender = ChunkSender::new(transport, config);

    let err = sender
        .send_file(UploadPlan::new(
            "Fence Detail.jpg",
            Category::Architecture,
            pattern_bytes(3000),
        ))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("connection reset"));

    let progress = sender.progress_of("Fence Detail.jpg").unwrap();
    assert_eq!(progress.status, UploadStatus::Error);
    assert_eq!(progress.chunks_uploaded, 1);
    assert!(progress.message.unwrap().contains("connection reset"));

    // Chunks after the failure were never sent
    let leftover = store.list("temp-chunks/").await.unwrap();
    assert_eq!(leftover.len(), 1, "only chunk 0 should have landed");
}

#[tokio::test]
async fn batch_upload_reports_aggregates_without_rollback() {
    let store = Arc::new(MemoryBlobStore::new());
    let config = GalleryConfig::default()
        .with_chunk_size(1024)
        .with_max_file_bytes(5000);
    let receiver = ChunkReceiver::with_store(store.clone(), config.clone());
    let sender = ChunkSender::new(receiver, config.clone());

    let report = sender
        .send_batch(vec![
            UploadPlan::new("Trellis.jpg", Category::Vegetables, pattern_bytes(3000)),
            UploadPlan::new("Too Big.mov", Category::Vegetables, pattern_bytes(10_000)),
        ])
        .await;

    assert_eq!(report.succeeded_count(), 1);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.failed[0].file_name, "Too Big.mov");
    assert!(report.failed[0].message.contains("exceeds maximum"));

    // The successful file stays published
    let adapter = GalleryAdapter::with_store(store, config);
    assert_eq!(adapter.list_media(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn gallery_listing_derives_media_from_paths() {
    let store = Arc::new(MemoryBlobStore::new());
    let adapter = GalleryAdapter::with_store(store.clone(), GalleryConfig::default());

    for (name, category, content_type) in [
        ("Queen Hive.jpg", "beekeeping", "image/jpeg"),
        ("Cabin Sketch.png", "sketches", "image/png"),
    ] {
        let result = adapter
            .upload_chunk(
                ChunkUpload::new("fid-listing", 0, 1, name, category, pattern_bytes(128))
                    .with_content_type(content_type),
            )
            .await
            .unwrap();
        assert!(matches!(result, ChunkResult::Complete { .. }));
    }

    let all = adapter.list_media(None).await.unwrap();
    assert_eq!(all.len(), 2);

    let bees = adapter.list_media(Some(Category::Beekeeping)).await.unwrap();
    assert_eq!(bees.len(), 1);
    assert_eq!(bees[0].name, "Queen Hive");
    assert_eq!(bees[0].media_type, MediaType::Image);

    adapter.delete_media(&bees[0].id).await.unwrap();
    assert_eq!(adapter.list_media(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn listing_tolerates_paths_from_foreign_naming_schemes() {
    let store = Arc::new(MemoryBlobStore::new());
    // A pre-migration object that never went through the codec
    store
        .put(
            "gallery/IMG_4032.JPG",
            Some("image/jpeg"),
            &Default::default(),
            atelier_blob::stream_bytes(pattern_bytes(99)),
        )
        .await
        .unwrap();

    let adapter = GalleryAdapter::with_store(store, GalleryConfig::default());
    let items = adapter.list_media(None).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].category, Category::FALLBACK);
    assert_eq!(items[0].name, "IMG 4032");
    assert_eq!(items[0].size_bytes, 99);
}
