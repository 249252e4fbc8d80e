use protolyzer_testkit::data_gen::{random_bytes, random_layout, random_value, sparse_bytes};

use crate::{
    Endianness, FieldLayout, Propagation, RawBuffer, StructuredBuffer, first_nonempty_field,
    raw_buffer::share_bytes,
};

fn random_endianness(rng: &mut fastrand::Rng) -> Endianness {
    if rng.bool() {
        Endianness::Big
    } else {
        Endianness::Little
    }
}

#[test]
fn test_count_invariant_under_relabel() {
    let mut rng = fastrand::Rng::with_seed(8312);
    for _ in 0..200 {
        let len = rng.usize(1..64);
        let mut buffer = RawBuffer::copy_from_slice(&random_bytes(&mut rng, len), Endianness::Big);
        let count = buffer.bits().count();
        for _ in 0..4 {
            buffer.set_endianness(random_endianness(&mut rng));
            assert_eq!(buffer.bits().count(), count);
        }
    }
}

#[test]
fn test_boolean_algebra_properties() {
    let mut rng = fastrand::Rng::with_seed(1117);
    for _ in 0..200 {
        let len = rng.usize(1..48);
        let a = RawBuffer::copy_from_slice(&random_bytes(&mut rng, len), random_endianness(&mut rng));
        let b = RawBuffer::copy_from_slice(&random_bytes(&mut rng, len), random_endianness(&mut rng));

        assert!((a.bits() ^ a.bits()).unwrap().bits().none());

        let xor = (a.bits() ^ b.bits()).unwrap();
        let restored = (xor.bits() ^ b.bits()).unwrap();
        assert_eq!(restored, a);

        let (count_a, count_b) = (a.bits().count(), b.bits().count());
        let and = (a.bits() & b.bits()).unwrap();
        assert!(and.bits().count() <= count_a.min(count_b));
        let or = (a.bits() | b.bits()).unwrap();
        assert!(or.bits().count() >= count_a.max(count_b));
        assert_eq!(
            and.bits().count() + or.bits().count(),
            count_a + count_b
        );
    }
}

#[test]
fn test_round_shift_restores() {
    let mut rng = fastrand::Rng::with_seed(4242);
    for _ in 0..100 {
        let len = rng.usize(1..24);
        let original = random_bytes(&mut rng, len);
        let mut buffer = RawBuffer::copy_from_slice(&original, random_endianness(&mut rng));
        let length = buffer.bits().length();
        let n = rng.usize(0..length);

        buffer.bits_mut().round_shift_left(n).unwrap();
        buffer.bits_mut().round_shift_left(length - n).unwrap();
        assert_eq!(buffer.to_vec(), original);

        let n = rng.usize(..);
        buffer.bits_mut().round_shift_left(n).unwrap();
        buffer.bits_mut().round_shift_right(n).unwrap();
        assert_eq!(buffer.to_vec(), original);
    }
}

#[test]
fn test_round_shift_moves_bits() {
    let mut rng = fastrand::Rng::with_seed(907);
    for _ in 0..50 {
        let len = rng.usize(1..8);
        let mut buffer =
            RawBuffer::copy_from_slice(&random_bytes(&mut rng, len), random_endianness(&mut rng));
        let before: Vec<bool> = buffer.bits().iter().collect();
        let length = before.len();
        let n = rng.usize(0..length * 2);

        buffer.bits_mut().round_shift_left(n).unwrap();
        let after: Vec<bool> = buffer.bits().iter().collect();
        for k in 0..length {
            assert_eq!(after[k], before[(k + n) % length]);
        }
    }
}

#[test]
fn test_all_zero_buffer_has_no_nonempty_field() {
    let mut rng = fastrand::Rng::with_seed(5150);
    for _ in 0..50 {
        let len = rng.usize(1..32);
        let buffer = RawBuffer::copy_from_slice(&vec![0u8; len], random_endianness(&mut rng));
        let widths = random_layout(&mut rng, len * 8, 20);
        let layout = FieldLayout::from_bits(&widths).unwrap();
        for start in 0..layout.len() {
            assert_eq!(first_nonempty_field(&buffer, &layout, start).unwrap(), None);
        }
    }
}

#[test]
fn test_nonempty_search_matches_bitwise_scan() {
    let mut rng = fastrand::Rng::with_seed(2718);
    for _ in 0..100 {
        let len = rng.usize(1..16);
        let bytes = sparse_bytes(&mut rng, len, 2);
        let widths = random_layout(&mut rng, len * 8, 12);

        let mut buffer = StructuredBuffer::with_endianness(random_endianness(&mut rng));
        buffer.assign_data_bits(&bytes, &widths).unwrap();

        let start = rng.usize(0..widths.len());
        let expected = (start..widths.len()).find(|&field| {
            (0..widths[field]).any(|bit| buffer.get_field_bit(field, bit).unwrap())
        });
        assert_eq!(buffer.get_nonempty_field_index(start, &widths).unwrap(), expected);
    }
}

#[test]
fn test_big_endian_fields_match_whole_buffer_bits() {
    let mut rng = fastrand::Rng::with_seed(31337);
    for _ in 0..100 {
        let len = rng.usize(1..24);
        let bytes = random_bytes(&mut rng, len);
        let widths = random_layout(&mut rng, len * 8, 64);

        let mut buffer = StructuredBuffer::with_endianness(Endianness::Big);
        buffer.assign_data_bits(&bytes, &widths).unwrap();
        let bits = buffer.data().bits();

        let mut offset = 0;
        for (field, &width) in widths.iter().enumerate() {
            let value = buffer.get_field_value::<u64>(field).unwrap();
            assert_eq!(value, bits.convert::<u64>(offset, offset + width).unwrap());
            offset += width;
        }
    }
}

#[test]
fn test_set_field_bytes_round_trip() {
    let mut rng = fastrand::Rng::with_seed(60606);
    for _ in 0..100 {
        let len = rng.usize(2..24);
        let widths = random_layout(&mut rng, len * 8, 24);
        let mut buffer = StructuredBuffer::with_endianness(random_endianness(&mut rng));
        buffer.assign_data_bits(&random_bytes(&mut rng, len), &widths).unwrap();

        let candidates: Vec<usize> = (0..widths.len()).filter(|&i| widths[i] % 8 == 0).collect();
        if candidates.is_empty() {
            continue;
        }
        let field = candidates[rng.usize(0..candidates.len())];
        let value = random_bytes(&mut rng, widths[field] / 8);
        let before = buffer.data().to_vec();

        buffer.set_field_bytes(field, &value).unwrap();
        let after = buffer.data().to_vec();
        let start = widths[..field].iter().sum::<usize>();

        // Only the bits of the target field change.
        let mut expected = RawBuffer::copy_from_slice(&before, Endianness::Big);
        {
            let mut bits = expected.bits_mut();
            for k in 0..widths[field] {
                bits.set(start + k, value[k / 8] & (0x80 >> (k % 8)) != 0).unwrap();
            }
        }
        assert_eq!(after, expected.to_vec());
    }
}

#[test]
fn test_sub_field_matches_value_bits() {
    let mut rng = fastrand::Rng::with_seed(777);
    for _ in 0..100 {
        let width = rng.usize(1..=128);
        let value = random_value(&mut rng, width);
        let pad = (8 - width % 8) % 8;
        let total = width + pad;

        // Place the value right-aligned in a big-endian record.
        let mut record = vec![0u8; total / 8];
        for k in 0..width {
            if value >> (width - 1 - k) & 1 == 1 {
                let position = pad + k;
                record[position / 8] |= 0x80 >> (position % 8);
            }
        }
        let mut layout = vec![width];
        if pad > 0 {
            layout.insert(0, pad);
        }
        let field = layout.len() - 1;

        let mut buffer = StructuredBuffer::with_endianness(Endianness::Big);
        buffer.assign_data_bits(&record, &layout).unwrap();
        assert_eq!(buffer.get_field_value::<u128>(field).unwrap(), value);

        let offset = rng.usize(0..width);
        let sub_width = rng.usize(1..=width - offset);
        let expected = (value >> (width - offset - sub_width))
            & if sub_width == 128 { u128::MAX } else { (1u128 << sub_width) - 1 };
        assert_eq!(
            buffer.get_sub_field::<u128>(field, offset, sub_width).unwrap(),
            expected
        );
    }
}

#[test]
fn test_independent_writes_stay_private() {
    let mut rng = fastrand::Rng::with_seed(99);
    for _ in 0..50 {
        let len = rng.usize(1..16);
        let mut source = random_bytes(&mut rng, len);
        let original = source.clone();
        let widths = random_layout(&mut rng, len * 8, 16);
        let layout = FieldLayout::from_bits(&widths).unwrap();
        let cells = share_bytes(&mut source);

        let observer = RawBuffer::reference(cells, Endianness::Big).unwrap();
        let mut private = StructuredBuffer::with_endianness(Endianness::Big);
        private.assign_reference(cells, layout.clone()).unwrap();
        let mut shared = StructuredBuffer::with_endianness(Endianness::Big);
        shared.assign_reference(cells, layout).unwrap();

        let field = rng.usize(0..widths.len());
        let bit = rng.usize(0..widths[field]);
        let flipped = !private.get_field_bit(field, bit).unwrap();

        private
            .set_field_bit(field, bit, flipped, Propagation::Independent)
            .unwrap();
        assert_eq!(observer.to_vec(), original);
        assert_eq!(private.get_field_bit(field, bit).unwrap(), flipped);

        shared
            .set_field_bit(field, bit, flipped, Propagation::Dependent)
            .unwrap();
        assert_ne!(observer.to_vec(), original);
        assert_eq!(observer.to_vec(), private.data().to_vec());
    }
}
