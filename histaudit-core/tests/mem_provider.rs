use histaudit_core::mem::*;
use histaudit_core::*;

fn labels(name: &str, job: &str) -> Labels {
    [(METRIC_NAME, name), ("job", job)].into_iter().collect()
}

fn block() -> MemBlock {
    MemBlock::builder("01HV2B6JQ4")
        .series(
            labels("rpc_seconds", "api"),
            vec![
                MemChunk::new(Encoding::Histogram, vec![0u8; 40], 120),
                MemChunk::new(Encoding::Histogram, vec![0u8; 24], 60),
            ],
        )
        .series(
            labels("up", "api"),
            vec![MemChunk::new(Encoding::Xor, vec![0u8; 16], 120)],
        )
        .series(
            labels("rpc_seconds", "db"),
            vec![MemChunk::new(Encoding::FloatHistogram, vec![0u8; 8], 10)],
        )
        .build()
}

#[test]
fn index_serves_values_and_postings() {
    let block = block();
    let index = block.index().unwrap();

    let names = index.label_values(METRIC_NAME).unwrap();
    assert_eq!(names, vec!["rpc_seconds".to_string(), "up".to_string()]);

    let all: Vec<SeriesRef> = index
        .postings(METRIC_NAME, &names)
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(all, vec![SeriesRef(0), SeriesRef(1), SeriesRef(2)]);

    let rpc: Vec<SeriesRef> = index
        .postings(METRIC_NAME, &["rpc_seconds".to_string()])
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(rpc, vec![SeriesRef(0), SeriesRef(2)]);

    let (series_labels, chunks) = index.series(SeriesRef(0)).unwrap();
    assert_eq!(series_labels.metric_name(), Some("rpc_seconds"));
    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].max_time < chunks[1].min_time);

    assert!(matches!(
        index.series(SeriesRef(42)),
        Err(Error::SeriesNotFound(SeriesRef(42)))
    ));
}

#[test]
fn chunk_reader_resolves_references() {
    let block = MemBlock::builder("b")
        .series(
            labels("rpc_seconds", "api"),
            vec![MemChunk::new(Encoding::Histogram, vec![1u8, 2, 3], 3)],
        )
        .dangling_series(labels("broken", "api"))
        .build();

    let index = block.index().unwrap();
    let chunks = block.chunks().unwrap();

    let (_, metas) = index.series(SeriesRef(0)).unwrap();
    let chunk = chunks.chunk(&metas[0]).unwrap();
    assert_eq!(chunk.encoding().unwrap(), Encoding::Histogram);
    assert_eq!(chunk.bytes(), &[1, 2, 3]);
    assert_eq!(chunk.num_samples(), 3);

    let (_, metas) = index.series(SeriesRef(1)).unwrap();
    assert!(matches!(
        chunks.chunk(&metas[0]),
        Err(Error::ChunkNotFound(_))
    ));
}

#[test]
fn readers_are_released_on_drop() {
    let block = block();
    assert_eq!(block.open_readers(), 0);
    {
        let _index = block.index().unwrap();
        let _chunks = block.chunks().unwrap();
        assert_eq!(block.open_readers(), 2);
    }
    assert_eq!(block.open_readers(), 0);
}

#[test]
fn read_client_filters_by_matchers_and_range() {
    let client = MemReadClient::new()
        .series(
            [("__aggregation__", "rpc_count:sum:counter")].into_iter().collect(),
            vec![Sample::float(10, 1.0), Sample::float(20, 2.0), Sample::float(30, 3.0)],
        )
        .series(
            [("__aggregation__", "other")].into_iter().collect(),
            vec![Sample::float(20, 9.0)],
        );

    let query = Query::new(15, 30).matcher("__aggregation__", "rpc_count:sum:counter");
    let set: Vec<Box<dyn Series + '_>> = client
        .read(&query, false)
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();

    assert_eq!(set.len(), 1);
    let samples: Vec<Sample> = set[0].samples().collect::<Result<_>>().unwrap();
    assert_eq!(samples, vec![Sample::float(20, 2.0), Sample::float(30, 3.0)]);

    assert_eq!(client.queries(), vec![(query, false)]);
}

#[test]
fn failing_read_client() {
    let client = MemReadClient::new().failing("connection refused");
    let err = client.read(&Query::new(0, 1), true).err().unwrap();
    assert!(matches!(err, Error::Provider(ref m) if m == "connection refused"));
    assert_eq!(client.queries().len(), 1);
}

#[test]
fn block_source_lists_blocks_in_order() {
    let source = MemBlockSource::new(vec![
        MemBlock::builder("a").build(),
        MemBlock::builder("b").build(),
    ]);
    let ids: Vec<String> = source
        .blocks()
        .unwrap()
        .iter()
        .map(|b| b.meta().id)
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}
