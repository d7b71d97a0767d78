use pullstream::{concat, merge_sorted, write_json_array, Stream, StreamContext};
use quickcheck::quickcheck;
use tokio::runtime::Runtime;

quickcheck! {
    fn prop_map_matches_elementwise_application(xs: Vec<i32>) -> bool {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = StreamContext::new();
            let streamed = Stream::from_iter(xs.clone())
                .map(|v| v.wrapping_mul(3))
                .collect(&ctx)
                .await
                .unwrap();
            let direct: Vec<i32> = xs.iter().map(|v| v.wrapping_mul(3)).collect();
            streamed == direct
        })
    }

    fn prop_filter_matches_retain(xs: Vec<i32>) -> bool {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = StreamContext::new();
            let streamed = Stream::from_iter(xs.clone())
                .filter(|v| v % 2 == 0)
                .collect(&ctx)
                .await
                .unwrap();
            let direct: Vec<i32> = xs.into_iter().filter(|v| v % 2 == 0).collect();
            streamed == direct
        })
    }

    fn prop_limit_and_skip_match_slices(xs: Vec<i32>, n: u8) -> bool {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = StreamContext::new();
            let n = n as usize;
            let limited = Stream::from_iter(xs.clone())
                .limit(n as i64)
                .collect(&ctx)
                .await
                .unwrap();
            let skipped = Stream::from_iter(xs.clone())
                .skip(n)
                .collect(&ctx)
                .await
                .unwrap();
            let direct_limit: Vec<i32> = xs.iter().copied().take(n).collect();
            let direct_skip: Vec<i32> = xs.iter().copied().skip(n).collect();
            limited == direct_limit && skipped == direct_skip
        })
    }

    fn prop_concat_matches_vec_concatenation(a: Vec<i32>, b: Vec<i32>, c: Vec<i32>) -> bool {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = StreamContext::new();
            let streamed = concat(vec![
                Stream::from_iter(a.clone()),
                Stream::from_iter(b.clone()),
                Stream::from_iter(c.clone()),
            ])
            .collect(&ctx)
            .await
            .unwrap();
            let mut direct = a;
            direct.extend(b);
            direct.extend(c);
            streamed == direct
        })
    }

    fn prop_merge_of_sorted_partitions_is_sorted_whole(xs: Vec<i32>) -> bool {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = StreamContext::new();
            let mut sorted = xs;
            sorted.sort();
            let mut parts: Vec<Vec<i32>> = vec![Vec::new(), Vec::new(), Vec::new()];
            for (i, v) in sorted.iter().enumerate() {
                parts[i % 3].push(*v);
            }
            let streamed = merge_sorted(
                |a: &i32, b: &i32| a.cmp(b),
                parts.into_iter().map(Stream::from_iter).collect(),
            )
            .collect(&ctx)
            .await
            .unwrap();
            streamed == sorted
        })
    }

    fn prop_json_array_round_trips(xs: Vec<i32>) -> bool {
        let rt = Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = StreamContext::new();
            let mut buf: Vec<u8> = Vec::new();
            write_json_array(&ctx, &mut buf, Stream::from_iter(xs.clone()))
                .await
                .unwrap();
            let decoded: Vec<i32> = serde_json::from_slice(&buf).unwrap();
            decoded == xs
        })
    }
}
